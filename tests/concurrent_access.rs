//! Concurrent access integration tests
//!
//! A built container is shared across threads; these tests check that
//! shared identities are constructed once and that unrelated identities do
//! not wait on each other.

use bindweave::{BindingEntry, Container, ContainerBuilder, ContractId, Resolver};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
pub struct CounterService {
    count: AtomicU32,
}

impl CounterService {
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }
}

struct SlowA;
struct SlowB;

fn counter_container(constructions: Arc<AtomicU32>) -> Container {
    let mut builder = ContainerBuilder::new();
    builder.concrete::<CounterService, _>(move |_| {
        constructions.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        Ok(CounterService { count: AtomicU32::new(0) })
    });
    builder.register(BindingEntry::bind::<CounterService>().as_single());
    builder.build()
}

#[test]
fn concurrent_first_access_constructs_singleton_once() {
    const THREADS: usize = 16;

    let constructions = Arc::new(AtomicU32::new(0));
    let container = counter_container(constructions.clone());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let service = container.get::<CounterService>().unwrap();
                service.increment();
                service
            })
        })
        .collect();

    let services: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert!(services.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(services[0].count.load(Ordering::SeqCst), THREADS as u32);
}

#[test]
fn concurrent_cached_multi_contract_binding_is_shared() {
    trait Reader: Send + Sync {}
    trait Writer: Send + Sync {}
    struct Journal;
    impl Reader for Journal {}
    impl Writer for Journal {}

    let constructions = Arc::new(AtomicU32::new(0));
    let counter = constructions.clone();

    let mut builder = ContainerBuilder::new();
    builder
        .concrete::<Journal, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            Ok(Journal)
        })
        .implements::<dyn Reader>(|j| j as Arc<dyn Reader>)
        .implements::<dyn Writer>(|j| j as Arc<dyn Writer>);
    builder.register(
        BindingEntry::bind::<dyn Reader>()
            .and::<dyn Writer>()
            .to::<Journal>()
            .as_cached(),
    );
    let container = builder.build();
    let barrier = Barrier::new(8);

    let instances = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let container = &container;
                let barrier = &barrier;
                s.spawn(move |_| {
                    barrier.wait();
                    if i % 2 == 0 {
                        container.resolve_one(&ContractId::of::<dyn Reader>()).unwrap()
                    } else {
                        container.resolve_one(&ContractId::of::<dyn Writer>()).unwrap()
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    })
    .unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|w| w[0].ptr_eq(&w[1])));
}

#[test]
fn unrelated_identities_construct_in_parallel() {
    let barrier = Arc::new(Barrier::new(2));

    let mut builder = ContainerBuilder::new();
    // Each factory blocks until the other one has started
    let a_barrier = barrier.clone();
    builder.concrete::<SlowA, _>(move |_| {
        a_barrier.wait();
        Ok(SlowA)
    });
    let b_barrier = barrier.clone();
    builder.concrete::<SlowB, _>(move |_| {
        b_barrier.wait();
        Ok(SlowB)
    });
    builder
        .register(BindingEntry::bind::<SlowA>().as_single())
        .register(BindingEntry::bind::<SlowB>().as_single());
    let container = builder.build();

    let a = {
        let container = container.clone();
        thread::spawn(move || container.get::<SlowA>().is_ok())
    };
    let b = {
        let container = container.clone();
        thread::spawn(move || container.get::<SlowB>().is_ok())
    };

    assert!(a.join().unwrap());
    assert!(b.join().unwrap());
    assert_eq!(container.cached_instance_count(), 2);
}

#[test]
fn transient_resolution_from_many_threads_never_shares() {
    let constructions = Arc::new(AtomicU32::new(0));
    let counter = constructions.clone();

    let mut builder = ContainerBuilder::new();
    builder.concrete::<CounterService, _>(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(CounterService { count: AtomicU32::new(0) })
    });
    builder.register(BindingEntry::bind::<CounterService>());
    let container = builder.build();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = container.clone();
            thread::spawn(move || {
                (0..25)
                    .map(|_| container.get::<CounterService>().unwrap().increment())
                    .all(|count| count == 1)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(constructions.load(Ordering::SeqCst), 200);
    assert_eq!(container.cached_instance_count(), 0);
}
