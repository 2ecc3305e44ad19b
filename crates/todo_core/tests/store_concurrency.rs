use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use todo_core::{ItemStore, MemorySlotRepository};

const THREADS: usize = 8;
const ADDS_PER_THREAD: usize = 25;

#[test]
fn concurrent_adds_on_shared_store_lose_no_updates() {
    let store = Arc::new(ItemStore::new(MemorySlotRepository::new()));

    let handles = (0..THREADS)
        .map(|thread_index| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 0..ADDS_PER_THREAD {
                    store.add_one(&format!("t{thread_index}-{n}"), "").unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let items = store.load().unwrap();
    assert_eq!(items.len(), THREADS * ADDS_PER_THREAD);
    let ids = items.iter().map(|item| &item.id).collect::<HashSet<_>>();
    assert_eq!(ids.len(), items.len());
}

#[test]
fn concurrent_toggles_and_adds_keep_collection_consistent() {
    let store = Arc::new(ItemStore::new(MemorySlotRepository::new()));
    let target = store.add_one("shared", "").unwrap();

    let toggler = {
        let store = Arc::clone(&store);
        let id = target.id.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                store.toggle_completed(id.as_str()).unwrap();
            }
        })
    };
    let adder = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for n in 0..50 {
                store.add_one(&format!("extra {n}"), "").unwrap();
            }
        })
    };
    toggler.join().unwrap();
    adder.join().unwrap();

    let items = store.load().unwrap();
    assert_eq!(items.len(), 51);
    // An even number of toggles lands back on the original value.
    assert!(!items[0].completed);
}
