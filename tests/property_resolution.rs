//! Property-based tests for resolution
//!
//! Sharing and ordering rules must hold whatever the shape of the binding
//! set.

use bindweave::{BindingEntry, ContainerBuilder, ContractId, Lifetime, Resolver, TypeToken};
use proptest::prelude::*;
use std::sync::Arc;

trait Plugin: Send + Sync {
    fn id(&self) -> u8;
}

macro_rules! plugins {
    ($($name:ident = $id:expr),* $(,)?) => {
        $(
            struct $name;
            impl Plugin for $name {
                fn id(&self) -> u8 { $id }
            }
        )*

        fn declare_plugins(builder: &mut ContainerBuilder) {
            $(
                builder
                    .concrete::<$name, _>(|_| Ok($name))
                    .implements::<dyn Plugin>(|p| p as Arc<dyn Plugin>);
            )*
        }

        fn plugin_token(index: usize) -> (TypeToken, u8) {
            let all = [$((TypeToken::of::<$name>(), $id)),*];
            all[index % all.len()]
        }
    };
}

plugins!(P0 = 0, P1 = 1, P2 = 2, P3 = 3);

fn lifetime_strategy() -> impl Strategy<Value = Lifetime> {
    prop_oneof![
        Just(Lifetime::Transient),
        Just(Lifetime::Cached),
        Just(Lifetime::Singleton),
    ]
}

proptest! {
    #[test]
    fn resolve_all_follows_declaration_order(
        picks in prop::collection::vec(0usize..4, 0..12),
        lifetime in lifetime_strategy(),
    ) {
        let mut builder = ContainerBuilder::new();
        declare_plugins(&mut builder);

        let mut expected = Vec::new();
        for &pick in &picks {
            let (token, id) = plugin_token(pick);
            expected.push(id);
            builder.register(BindingEntry::bind::<dyn Plugin>().to_token(token).lifetime(lifetime));
        }

        let container = builder.build();
        let ids: Vec<u8> = container.get_all::<dyn Plugin>().unwrap().iter().map(|p| p.id()).collect();
        prop_assert_eq!(ids, expected);

        let single = container.try_get::<dyn Plugin>();
        match picks.len() {
            0 => prop_assert!(matches!(single, Ok(None))),
            1 => prop_assert!(matches!(single, Ok(Some(_)))),
            _ => prop_assert!(single.is_err()),
        }
    }
}

proptest! {
    #[test]
    fn repeated_resolution_shares_unless_transient(
        pick in 0usize..4,
        lifetime in lifetime_strategy(),
        qualifier in proptest::option::of("[a-z]{1,8}"),
    ) {
        let (token, _) = plugin_token(pick);
        let mut entry = BindingEntry::bind::<dyn Plugin>().to_token(token).lifetime(lifetime);
        if let Some(q) = &qualifier {
            entry = entry.qualifier(q.as_str());
        }

        let mut builder = ContainerBuilder::new();
        declare_plugins(&mut builder);
        builder.register(entry);
        let container = builder.build();

        let contract = ContractId::of::<dyn Plugin>();
        let a = container.resolve_one(&contract).unwrap();
        let b = container.resolve_one(&contract).unwrap();
        prop_assert_eq!(a.ptr_eq(&b), lifetime != Lifetime::Transient);
        prop_assert_eq!(a.concrete(), token);
    }
}

proptest! {
    #[test]
    fn singletons_are_keyed_by_concrete_and_qualifier(
        left in proptest::option::of(0u8..3),
        right in proptest::option::of(0u8..3),
    ) {
        let name = |q: Option<u8>| q.map(|n| format!("q{}", n));

        let mut left_entry = BindingEntry::bind::<dyn Plugin>().to::<P1>().as_single();
        if let Some(q) = name(left) {
            left_entry = left_entry.qualifier(q);
        }
        let mut right_entry = BindingEntry::bind::<P1>().as_single();
        if let Some(q) = name(right) {
            right_entry = right_entry.qualifier(q);
        }

        let mut builder = ContainerBuilder::new();
        declare_plugins(&mut builder);
        builder.register(left_entry).register(right_entry);
        let container = builder.build();

        let via_contract = container.resolve_one(&ContractId::of::<dyn Plugin>()).unwrap();
        let via_self = container.resolve_one(&ContractId::of::<P1>()).unwrap();
        prop_assert_eq!(via_contract.ptr_eq(&via_self), left == right);
    }
}
