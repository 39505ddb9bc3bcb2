use dynarr::{DynArray, Error};
use rand::{thread_rng, Rng};

fn assert_same(arr: &DynArray<u32>, model: &[u32]) {
    assert_eq!(model.len(), arr.len());
    assert!(arr.len() <= arr.capacity());
    assert_eq!(model, arr.as_slice());
}

// random sequences of operations, checked against Vec.
#[test]
fn test_rand_ops_against_vec() {
    let mut rng = thread_rng();
    for _ in 0..64 {
        let mut arr = DynArray::new();
        let mut model: Vec<u32> = Vec::new();
        for _ in 0..512 {
            match rng.gen_range(0..9) {
                0 | 1 => {
                    let v = rng.gen();
                    let full = arr.len() == arr.capacity();
                    let cap = arr.capacity();
                    arr.push(v);
                    model.push(v);
                    if full {
                        assert_eq!(if cap == 0 { 1 } else { cap * 2 }, arr.capacity());
                    }
                }
                2 => {
                    let idx = rng.gen_range(0..model.len() + 2);
                    let v = rng.gen();
                    let cap = arr.capacity();
                    let res = arr.insert(arr.pos(idx), v);
                    if idx <= model.len() {
                        assert_eq!(idx, res.unwrap().index());
                        model.insert(idx, v);
                    } else {
                        assert!(matches!(res, Err(Error::IndexOutOfBound(_))));
                        assert_eq!(cap, arr.capacity());
                    }
                }
                3 => {
                    let idx = rng.gen_range(0..model.len() + 1);
                    let res = arr.erase(arr.pos(idx));
                    if idx < model.len() {
                        let next = res.unwrap();
                        model.remove(idx);
                        assert_eq!(model.get(idx), arr.get_pos(next).ok());
                    } else {
                        assert!(res.is_err());
                    }
                }
                4 => {
                    let idx = rng.gen_range(0..model.len() + 1);
                    assert_eq!(model.get(idx), arr.at(idx).ok());
                }
                5 => {
                    let n = rng.gen_range(0..model.len() + 8);
                    arr.resize(n);
                    if n != model.len() {
                        assert_eq!(n, arr.capacity());
                    }
                    model.resize(n, 0);
                }
                6 => {
                    let other: DynArray<u32> = (0..rng.gen_range(0..8)).map(|_| rng.gen()).collect();
                    let required = arr.len() + other.len();
                    let cap = arr.capacity();
                    arr += &other;
                    model.extend_from_slice(&other);
                    if cap < required {
                        assert_eq!(required, arr.capacity());
                    } else {
                        assert_eq!(cap, arr.capacity());
                    }
                }
                7 => {
                    assert_eq!(model.pop(), arr.pop());
                }
                _ => {
                    let cloned = arr.clone();
                    assert_eq!(cloned, arr);
                    assert_eq!(cloned.len(), cloned.capacity());
                }
            }
            assert_same(&arr, &model);
        }
        let collected: Vec<u32> = arr.into_iter().collect();
        assert_eq!(model, collected);
    }
}

#[test]
fn test_rand_erase_insert_restores() {
    let mut rng = thread_rng();
    for _ in 0..256 {
        let len = rng.gen_range(1..64);
        let orig: DynArray<u32> = (0..len).map(|_| rng.gen()).collect();
        let mut arr = orig.clone();
        let idx = rng.gen_range(0..len);
        let v = arr[idx];
        let pos = arr.erase(arr.pos(idx)).unwrap();
        arr.insert(pos, v).unwrap();
        assert_eq!(orig, arr);
    }
}

#[test]
fn test_rand_concat() {
    let mut rng = thread_rng();
    for _ in 0..256 {
        let a: DynArray<u32> = (0..rng.gen_range(0..32)).map(|_| rng.gen()).collect();
        let b: DynArray<u32> = (0..rng.gen_range(0..32)).map(|_| rng.gen()).collect();
        let c = &a + &b;
        assert_eq!(a.len() + b.len(), c.len());
        let expected: Vec<u32> = a.iter().chain(b.iter()).copied().collect();
        assert_eq!(c, expected);
    }
}

#[test]
fn test_copy_and_move_semantics() {
    let mut rng = thread_rng();
    for _ in 0..64 {
        let x: DynArray<u32> = (0..rng.gen_range(0..32)).map(|_| rng.gen()).collect();
        let copied = x.clone();
        assert_eq!(x, copied);

        let mut src = x.clone();
        let moved = DynArray::take(&mut src);
        assert_eq!(x, moved);
        assert_eq!(0, src.len());
        assert_eq!(0, src.capacity());

        let mut assigned = DynArray::from([1u32, 2, 3]);
        assigned.clone_from(&moved);
        assert_eq!(x, assigned);
        assert_eq!(moved.capacity(), assigned.capacity());
    }
}
