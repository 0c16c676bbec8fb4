use bindweave::{BindingEntry, ContainerBuilder, ContractId, Lifetime, ProviderId, TypeToken};

trait Source: Send + Sync {}
trait Sink: Send + Sync {}
struct Pipe;
struct Tank;

#[test]
fn descriptors_follow_expansion_order() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BindingEntry::bind::<Pipe>().as_cached())
        .register(
            BindingEntry::bind::<dyn Source>()
                .and::<dyn Sink>()
                .to_list([TypeToken::of::<Pipe>(), TypeToken::of::<Tank>()])
                .as_single_with("main")
                .non_lazy(),
        );

    let descriptors = builder.build().descriptors();
    assert_eq!(descriptors.len(), 3);

    let first = &descriptors[0];
    assert_eq!(first.id, ProviderId { entry: 0, index: 0 });
    assert_eq!(first.contracts, vec![ContractId::of::<Pipe>()]);
    assert_eq!(first.lifetime, Lifetime::Cached);
    assert!(!first.eager);
    assert!(first.qualifier.is_none());

    let tank = &descriptors[2];
    assert_eq!(tank.id, ProviderId { entry: 1, index: 1 });
    assert_eq!(tank.concrete, TypeToken::of::<Tank>());
    assert!(tank.serves(&ContractId::of::<dyn Source>()));
    assert!(tank.serves(&ContractId::of::<dyn Sink>()));
    assert!(!tank.serves(&ContractId::of::<Tank>()));
    assert_eq!(tank.qualifier.as_deref(), Some("main"));
    assert!(tank.eager);
    assert!(tank.concrete_name().ends_with("Tank"));
}

#[test]
fn summary_mentions_everything() {
    let mut builder = ContainerBuilder::new();
    builder.register(BindingEntry::bind::<dyn Source>().to::<Pipe>().as_single_with("x").non_lazy());

    let summary = builder.build().descriptors()[0].summary();
    assert!(summary.starts_with("[0.0] "));
    assert!(summary.contains("Source"));
    assert!(summary.contains("Pipe"));
    assert!(summary.contains("Singleton"));
    assert!(summary.contains("qualifier=x"));
    assert!(summary.ends_with(" eager"));
}

#[test]
fn self_binding_with_several_contracts_gives_one_descriptor_each() {
    let mut builder = ContainerBuilder::new();
    builder.register(BindingEntry::bind::<Pipe>().and::<Tank>());

    let descriptors = builder.build().descriptors();
    let concretes: Vec<_> = descriptors.iter().map(|d| d.concrete).collect();
    assert_eq!(concretes, vec![TypeToken::of::<Pipe>(), TypeToken::of::<Tank>()]);
}

#[cfg(feature = "diagnostics")]
#[test]
fn debug_string_lists_providers_and_contracts() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BindingEntry::bind::<dyn Source>().to::<Pipe>())
        .register(BindingEntry::bind::<dyn Source>().to::<Tank>());

    let dump = builder.build().to_debug_string();
    assert!(dump.starts_with("=== Container Debug ==="));
    assert!(dump.contains("2 provider(s)"));
    assert!(dump.contains("Cached instances: 0"));
}
