use std::sync::Arc;
use std::thread;

use swarmcog_core::{Atom, AtomType, KnowledgeStore, SequentialIdGenerator};

#[test]
fn concurrent_add_and_remove_keep_indices_consistent() {
    let store = Arc::new(KnowledgeStore::with_id_generator(
        "concurrency",
        Arc::new(SequentialIdGenerator::new("c")),
    ));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut kept = 0;
                for i in 0..200 {
                    let atom_type = if i % 2 == 0 {
                        AtomType::GoalNode
                    } else {
                        AtomType::BeliefNode
                    };
                    let name = format!("w{worker}-{}", i % 10);
                    let id = store
                        .add_atom(Atom::node(store.next_id(), atom_type, name, None))
                        .unwrap();
                    if i % 3 == 0 {
                        store.remove_atom(&id).unwrap();
                    } else {
                        kept += 1;
                        store.add_to_attentional_focus(id);
                    }
                    if i % 25 == 0 {
                        store.update_attention_values();
                        store.get_most_important_atoms(5);
                    }
                }
                kept
            })
        })
        .collect();

    let kept: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(store.atom_count(), kept);
    assert!(store.index_violations().is_empty(), "{:?}", store.index_violations());
    assert!(store.attentional_focus().len() <= swarmcog_core::space::FOCUS_CAPACITY);

    let stats = store.statistics();
    assert_eq!(
        stats.get("type_goal_node").copied().unwrap_or(0)
            + stats.get("type_belief_node").copied().unwrap_or(0),
        kept
    );
}

#[test]
fn concurrent_agent_nodes_get_distinct_names() {
    let store = Arc::new(KnowledgeStore::new("names"));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..10)
                    .map(|_| store.add_agent_node("agent", &[]).unwrap().name)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut names: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 40);
    assert_eq!(store.get_atoms_by_type(AtomType::AgentNode).len(), 40);
}

#[test]
fn removed_endpoint_resolves_to_not_found() {
    let store = KnowledgeStore::new("dangling");
    let a = store.add_agent_node("a", &[]).unwrap().id;
    let b = store.add_agent_node("b", &[]).unwrap().id;
    let link = store.add_trust_relationship(&a, &b, 0.6).unwrap();

    store.remove_atom(&a).unwrap();

    let err = store.resolve_outgoing(&link.id).unwrap_err();
    assert!(err.is_not_found());
    // The link itself survives; only its endpoint is gone.
    assert_eq!(store.get_atom(&link.id).unwrap().arity(), 2);
    assert!(store.get_trust_level(&a, &b) > 0.5);
}
