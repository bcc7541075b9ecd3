//! Randomized equivalence tests: every structure is driven alongside a naive
//! model of what it should contain, and the two are compared at each step.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::prelude::*;

use retro::map::TimePoint as MapTime;
use retro::order_list::{OrderList, Token};
use retro::queue::{Pop, Push, TimePoint};
use retro::{FullMap, Label, PartialQueue};

fn check_all_pairs<T, L: Label>(list: &OrderList<T, L>, toks: &[Token]) {
    for (i, &a) in toks.iter().enumerate() {
        assert_eq!(list.order(a, a), Ordering::Equal);
        for &b in &toks[i + 1..] {
            assert_eq!(list.order(a, b), Ordering::Less);
            assert_eq!(list.order(b, a), Ordering::Greater);
        }
    }
}

fn random_order_list_inserts<L: Label>(seed: u64, ops: usize) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut list: OrderList<u32, L> = OrderList::new();
    let mut toks: Vec<Token> = Vec::new();
    let mut model: Vec<u32> = Vec::new();

    for i in 0..ops {
        let pos = rng.gen_range(0..=model.len());
        let before = if pos == model.len() { list.end() } else { toks[pos] };
        let tok = list.insert_before(before, i as u32);
        toks.insert(pos, tok);
        model.insert(pos, i as u32);

        assert_eq!(list.len(), model.len());
        assert!(list.iter().eq(model.iter()));
        if i % 64 == 0 {
            list.dbg_check();
        }
    }

    list.dbg_check();
    check_all_pairs(&list, &toks);

    // Tokens handed out early survived every relabel in between.
    for (pos, &tok) in toks.iter().enumerate() {
        assert_eq!(*list.get(tok), model[pos]);
    }
}

#[test]
fn order_list_random_inserts() {
    random_order_list_inserts::<u64>(20, 400);
}

#[test]
fn order_list_random_inserts_u16_labels() {
    // A small label space makes relabels constant instead of rare.
    random_order_list_inserts::<u16>(21, 600);
}

#[test]
fn order_list_u8_labels_to_the_limit() {
    let mut rng = SmallRng::seed_from_u64(22);
    let mut list: OrderList<u32, u8> = OrderList::new();
    let mut toks: Vec<Token> = Vec::new();
    let mut model: Vec<u32> = Vec::new();

    while list.len() < list.max_size() {
        let pos = rng.gen_range(0..=model.len());
        let before = if pos == model.len() { list.end() } else { toks[pos] };
        let v = list.len() as u32;
        let tok = list.insert_before(before, v);
        toks.insert(pos, tok);
        model.insert(pos, v);
    }

    assert_eq!(list.len(), 244);
    assert!(list.iter().eq(model.iter()));
    list.dbg_check();
    check_all_pairs(&list, &toks);
}

fn random_queue_ops_once(seed: u64, ops: usize) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut q: PartialQueue<u32> = PartialQueue::new();

    // The model: every surviving push in time order, plus the number of
    // outstanding pops. The live queue is the history minus its first
    // `popped` elements.
    let mut hist: Vec<(TimePoint<Push>, u32)> = Vec::new();
    let mut pops: Vec<TimePoint<Pop>> = Vec::new();
    let mut popped = 0usize;
    let mut next = 0u32;

    for _ in 0..ops {
        let live = hist.len() - popped;
        match rng.gen_range(0..6) {
            0 | 1 => {
                let t = q.push(next);
                hist.push((t, next));
                next += 1;
            }
            2 => {
                if hist.is_empty() {
                    continue;
                }
                let j = rng.gen_range(0..hist.len());
                let t = q.push_before(&hist[j].0, next);
                hist.insert(j, (t, next));
                next += 1;
            }
            3 => {
                if live == 0 {
                    continue;
                }
                pops.push(q.pop());
                popped += 1;
            }
            4 => {
                if hist.is_empty() || live == 0 {
                    continue;
                }
                let j = rng.gen_range(0..hist.len());
                let (t, _) = hist.remove(j);
                q.revert_push(t);
            }
            _ => {
                if popped == 0 {
                    continue;
                }
                q.revert_pop(pops.pop().unwrap());
                popped -= 1;
            }
        }

        let live_vals: Vec<u32> = hist[popped..].iter().map(|&(_, v)| v).collect();
        assert_eq!(q.len(), live_vals.len());
        assert!(q.iter().eq(live_vals.iter()));
        assert_eq!(q.front(), live_vals.first());
        assert_eq!(q.back(), live_vals.last());
        q.dbg_check();
    }
}

#[test]
fn queue_random_ops() {
    for seed in 0..30 {
        random_queue_ops_once(seed, 200);
    }
}

fn replay(timeline: &[(MapTime, u8, Option<u32>)], upto: usize) -> BTreeMap<u8, u32> {
    let mut m = BTreeMap::new();
    for &(_, key, value) in &timeline[..upto] {
        match value {
            Some(v) => {
                m.insert(key, v);
            }
            None => {
                m.remove(&key);
            }
        }
    }
    m
}

fn random_map_ops_once(seed: u64, ops: usize) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut m: FullMap<u8, u32> = FullMap::new();

    // The model: every operation in time order. A `Some` value is an
    // insert, `None` an erase; folding a prefix gives the map just before
    // the operation that follows it.
    let mut timeline: Vec<(MapTime, u8, Option<u32>)> = Vec::new();
    let mut next = 0u32;

    for _ in 0..ops {
        let key = rng.gen_range(0..12u8);
        let retro = !timeline.is_empty() && rng.gen_bool(0.4);
        let j = if retro { rng.gen_range(0..timeline.len()) } else { timeline.len() };

        if rng.gen_bool(0.7) {
            let tp = if retro {
                m.insert_before(&timeline[j].0, key, next)
            } else {
                m.insert(key, next)
            };
            timeline.insert(j, (tp, key, Some(next)));
            next += 1;
        } else {
            let ever_inserted = timeline.iter().any(|&(_, k, v)| k == key && v.is_some());
            let tp = if retro {
                m.erase_before(&timeline[j].0, &key)
            } else {
                m.erase(&key)
            };
            assert_eq!(tp.is_some(), ever_inserted);
            if let Some(tp) = tp {
                timeline.insert(j, (tp, key, None));
            }
        }

        let present = replay(&timeline, timeline.len());
        assert_eq!(m.len(), present.len());
        assert_eq!(m.is_empty(), present.is_empty());
        assert!(m.iter().map(|(&k, &v)| (k, v)).eq(present.iter().map(|(&k, &v)| (k, v))));
        for k in 0..12u8 {
            assert_eq!(m.get(&k), present.get(&k));
        }

        for _ in 0..3 {
            if timeline.is_empty() {
                break;
            }
            let j = rng.gen_range(0..timeline.len());
            let past = replay(&timeline, j);
            let tp = timeline[j].0;
            assert_eq!(m.len_at(&tp), past.len());
            assert!(m.iter_at(&tp).map(|(&k, &v)| (k, v)).eq(past.iter().map(|(&k, &v)| (k, v))));
            for k in 0..12u8 {
                assert_eq!(m.get_at(&tp, &k), past.get(&k));
            }
        }
        m.dbg_check();
    }
}

#[test]
fn map_random_ops() {
    for seed in 0..20 {
        random_map_ops_once(seed, 150);
    }
}

#[test]
#[ignore]
fn fuzz_forever() {
    for seed in 0.. {
        if seed % 10 == 0 {
            println!("seed {}", seed);
        }
        random_order_list_inserts::<u16>(seed, 600);
        random_queue_ops_once(seed, 300);
        random_map_ops_once(seed, 200);
    }
}
