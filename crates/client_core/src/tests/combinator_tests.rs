use super::*;

#[test]
fn waits_for_every_input_before_emitting() {
    let mut combinator = Combinator::new();
    let a = combinator.input::<i32>("a").expect("a");
    let b = combinator.input::<i32>("b").expect("b");

    assert!(!combinator.push(&a, 1));
    assert_eq!(combinator.pending(), vec!["b"]);
    assert!(combinator.push(&b, 2));
    assert_eq!(combinator.emitted(), 1);

    assert_eq!(combinator.get(&a), Some(&1));
    assert_eq!(combinator.get(&b), Some(&2));
}

#[test]
fn gating_is_independent_of_arrival_order() {
    let mut combinator = Combinator::new();
    let a = combinator.input::<i32>("a").expect("a");
    let b = combinator.input::<&str>("b").expect("b");

    assert!(!combinator.push(&b, "two"));
    assert!(combinator.push(&a, 1));
    assert_eq!(combinator.emitted(), 1);
}

#[test]
fn emits_once_per_update_after_priming_and_carries_others_forward() {
    let mut combinator = Combinator::new();
    let a = combinator.input::<i32>("a").expect("a");
    let b = combinator.input::<i32>("b").expect("b");
    combinator.push(&a, 1);
    combinator.push(&b, 2);

    assert!(combinator.push(&a, 10));
    assert!(combinator.push(&a, 11));

    assert_eq!(combinator.emitted(), 3);
    assert_eq!(combinator.get(&a), Some(&11));
    assert_eq!(combinator.get(&b), Some(&2));
    assert_eq!(combinator.updates(&b), 1);
}

#[test]
fn repeated_updates_before_priming_do_not_emit() {
    let mut combinator = Combinator::new();
    let a = combinator.input::<i32>("a").expect("a");
    let _b = combinator.input::<i32>("b").expect("b");

    for value in 0..5 {
        assert!(!combinator.push(&a, value));
    }
    assert_eq!(combinator.emitted(), 0);
    assert_eq!(combinator.get(&a), Some(&4));
}

#[test]
fn batch_yields_a_single_snapshot() {
    let mut combinator = Combinator::new();
    let a = combinator.input::<i32>("a").expect("a");
    let b = combinator.input::<i32>("b").expect("b");
    let c = combinator.input::<Option<String>>("c").expect("c");

    let mut batch = combinator.batch();
    batch.set(&a, 1).set(&b, 2).set(&c, None);
    assert!(batch.commit());
    assert_eq!(combinator.emitted(), 1);

    let mut batch = combinator.batch();
    batch.set(&a, 5).set(&c, Some("x".to_string()));
    assert!(batch.commit());
    assert_eq!(combinator.emitted(), 2);
}

#[test]
fn empty_batch_does_not_emit() {
    let mut combinator = Combinator::new();
    let a = combinator.input::<i32>("a").expect("a");
    combinator.push(&a, 1);

    assert!(!combinator.batch().commit());
    assert_eq!(combinator.emitted(), 1);
}

#[test]
fn rejects_duplicate_and_late_registration() {
    let mut combinator = Combinator::new();
    let a = combinator.input::<i32>("a").expect("a");
    assert_eq!(
        combinator.input::<i32>("a").unwrap_err(),
        CombinatorError::DuplicateInput("a")
    );

    combinator.push(&a, 1);
    assert_eq!(
        combinator.input::<i32>("late").unwrap_err(),
        CombinatorError::Sealed("late")
    );
}

#[test]
fn handles_from_another_combinator_are_ignored() {
    let mut first = Combinator::new();
    let mut second = Combinator::new();
    let foreign = first.input::<i32>("a").expect("a");
    let local = second.input::<i32>("a").expect("a");

    assert!(!second.push(&foreign, 7));
    assert_eq!(second.get(&local), None);
    assert_eq!(second.get(&foreign), None);
}

#[test]
fn composes_many_heterogeneous_inputs() {
    let mut combinator = Combinator::new();
    let names = [
        "n00", "n01", "n02", "n03", "n04", "n05", "n06", "n07", "n08", "n09", "n10", "n11",
        "n12", "n13", "n14", "n15", "n16", "n17", "n18", "n19", "n20",
    ];
    let inputs: Vec<Input<usize>> = names
        .iter()
        .map(|name| combinator.input(*name).expect("register"))
        .collect();
    let flag = combinator.input::<bool>("flag").expect("flag");

    for (value, input) in inputs.iter().enumerate() {
        assert!(!combinator.push(input, value));
    }
    assert!(combinator.push(&flag, true));
    assert_eq!(combinator.len(), 22);
    assert_eq!(combinator.get(&inputs[20]), Some(&20));
}
