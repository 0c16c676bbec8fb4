use bindweave::{BindingEntry, ContainerBuilder, ContractId, DiError, Lifetime, Resolver};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn assert_cycle(result: Result<(), DiError>, expected: &[&str]) {
    match result {
        Err(DiError::CyclicDependency(path)) => {
            assert_eq!(path.len(), expected.len(), "wrong path length: {:?}", path);
            for (name, want) in path.iter().zip(expected) {
                assert!(name.ends_with(want), "expected {} in path, got {:?}", want, path);
            }
        }
        Err(other) => panic!("expected CyclicDependency, got {}", other),
        Ok(()) => panic!("expected CyclicDependency, resolution succeeded"),
    }
}

#[test]
fn test_self_circular_dependency() {
    struct SelfReferencing;

    let mut builder = ContainerBuilder::new();
    builder.concrete::<SelfReferencing, _>(|ctx| {
        ctx.get::<SelfReferencing>()?;
        Ok(SelfReferencing)
    });
    builder.register(BindingEntry::bind::<SelfReferencing>());

    let container = builder.build();
    assert_cycle(
        container.get::<SelfReferencing>().map(|_| ()),
        &["SelfReferencing", "SelfReferencing"],
    );
}

struct A {
    _b: Arc<B>,
}

struct B {
    _c: Arc<C>,
}

struct C {
    _a: Arc<A>,
}

fn three_cycle(lifetime: Lifetime) -> ContainerBuilder {
    let mut builder = ContainerBuilder::new();
    builder.concrete::<A, _>(|ctx| Ok(A { _b: ctx.get()? }));
    builder.concrete::<B, _>(|ctx| Ok(B { _c: ctx.get()? }));
    builder.concrete::<C, _>(|ctx| Ok(C { _a: ctx.get()? }));
    builder
        .register(BindingEntry::bind::<A>().lifetime(lifetime))
        .register(BindingEntry::bind::<B>().lifetime(lifetime))
        .register(BindingEntry::bind::<C>().lifetime(lifetime));
    builder
}

#[test]
fn test_three_level_circular_transient() {
    let container = three_cycle(Lifetime::Transient).build();
    assert_cycle(container.get::<A>().map(|_| ()), &["::A", "::B", "::C", "::A"]);
}

#[test]
fn test_circular_through_cached_identities_does_not_deadlock() {
    let container = three_cycle(Lifetime::Cached).build();
    assert_cycle(container.get::<B>().map(|_| ()), &["::B", "::C", "::A", "::B"]);
    assert_eq!(container.cached_instance_count(), 0);
}

#[test]
fn test_circular_through_singletons_does_not_deadlock() {
    let container = three_cycle(Lifetime::Singleton).build();
    assert_cycle(container.get::<C>().map(|_| ()), &["::C", "::A", "::B", "::C"]);
    // A second request sees the same failure, not a poisoned slot
    assert_cycle(container.get::<C>().map(|_| ()), &["::C", "::A", "::B", "::C"]);
}

#[test]
fn test_cycle_entered_from_two_threads_fails_on_both() {
    struct Ping(Arc<Pong>);
    struct Pong(Arc<Ping>);

    let mut builder = ContainerBuilder::new();
    builder.concrete::<Ping, _>(|ctx| {
        thread::sleep(Duration::from_millis(50));
        Ok(Ping(ctx.get()?))
    });
    builder.concrete::<Pong, _>(|ctx| {
        thread::sleep(Duration::from_millis(50));
        Ok(Pong(ctx.get()?))
    });
    builder
        .register(BindingEntry::bind::<Ping>().as_single())
        .register(BindingEntry::bind::<Pong>().as_single());
    let container = builder.build();

    let barrier = Arc::new(Barrier::new(2));
    let (tx, rx) = mpsc::channel();
    for start_with_ping in [true, false] {
        let container = container.clone();
        let barrier = barrier.clone();
        let tx = tx.clone();
        thread::spawn(move || {
            barrier.wait();
            let result = if start_with_ping {
                container.get::<Ping>().map(|_| ())
            } else {
                container.get::<Pong>().map(|_| ())
            };
            let _ = tx.send(result);
        });
    }

    for _ in 0..2 {
        let result = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("resolver blocked on a cross-thread cycle");
        assert!(
            matches!(&result, Err(DiError::CyclicDependency(path)) if path.len() == 3),
            "expected CyclicDependency, got {:?}",
            result.err()
        );
    }
    assert_eq!(container.cached_instance_count(), 0);
}

#[test]
fn test_cycle_through_contract_views() {
    trait Service: Send + Sync {}

    struct Impl {
        _inner: Arc<dyn Service>,
    }
    impl Service for Impl {}

    let mut builder = ContainerBuilder::new();
    builder
        .concrete::<Impl, _>(|ctx| Ok(Impl { _inner: ctx.get::<dyn Service>()? }))
        .implements::<dyn Service>(|i| i as Arc<dyn Service>);
    builder.register(BindingEntry::bind::<dyn Service>().to::<Impl>().as_single());

    let container = builder.build();
    assert!(matches!(
        container.resolve_one(&ContractId::of::<dyn Service>()),
        Err(DiError::CyclicDependency(path)) if path.len() == 2
    ));
}

#[test]
fn test_diamond_is_not_a_cycle() {
    struct Shared;
    struct Left(Arc<Shared>);
    struct Right(Arc<Shared>);
    struct Top(Arc<Left>, Arc<Right>);

    let mut builder = ContainerBuilder::new();
    builder.concrete::<Shared, _>(|_| Ok(Shared));
    builder.concrete::<Left, _>(|ctx| Ok(Left(ctx.get()?)));
    builder.concrete::<Right, _>(|ctx| Ok(Right(ctx.get()?)));
    builder.concrete::<Top, _>(|ctx| Ok(Top(ctx.get()?, ctx.get()?)));
    builder
        .register(BindingEntry::bind::<Shared>().as_single())
        .register(BindingEntry::bind::<Left>())
        .register(BindingEntry::bind::<Right>())
        .register(BindingEntry::bind::<Top>());

    let container = builder.build();
    let top = container.get::<Top>().unwrap();
    assert!(Arc::ptr_eq(&(top.0).0, &(top.1).0));
}

#[test]
fn test_cycle_error_display() {
    let err = DiError::CyclicDependency(vec!["A", "B", "A"]);
    assert_eq!(err.to_string(), "Cyclic dependency: A -> B -> A");
}
