use faraid::forward::{ForwardChainingEngine, ResidualClaim, SurplusPolicy};
use faraid::fraction::{frac, Fraction};
use faraid::heirs::{validate, FactSet, HeirClass, HeirInstance};

fn single(class: HeirClass) -> HeirInstance {
    HeirInstance::single(class)
}

/// Every valid family up to two members per multi-member class
fn valid_families() -> Vec<FactSet> {
    let spouses = [(None, 0), (Some(HeirClass::Husband), 1), (Some(HeirClass::Wife), 1), (Some(HeirClass::Wife), 3)];
    let mut families = Vec::new();
    for sons in 0..=2 {
        for daughters in 0..=2 {
            for (spouse, spouse_count) in spouses {
                for father in 0..=1 {
                    for mother in 0..=1 {
                        for brothers in 0..=2 {
                            for sisters in 0..=2 {
                                let mut facts = FactSet::new()
                                    .with(HeirClass::Son, sons)
                                    .with(HeirClass::Daughter, daughters)
                                    .with(HeirClass::Father, father)
                                    .with(HeirClass::Mother, mother)
                                    .with(HeirClass::Brother, brothers)
                                    .with(HeirClass::Sister, sisters);
                                if let Some(class) = spouse {
                                    facts.set(class, spouse_count);
                                }
                                if validate(&facts).is_empty() {
                                    families.push(facts);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    families
}

#[test]
fn test_two_sons_split_equally() {
    let result = ForwardChainingEngine::new().calculate(&FactSet::new().with(HeirClass::Son, 2));
    assert_eq!(result.fraction_of(&HeirInstance::nth(HeirClass::Son, 1)), frac(1, 2));
    assert_eq!(result.fraction_of(&HeirInstance::nth(HeirClass::Son, 2)), frac(1, 2));
    assert_eq!(result.total_distributed, frac(1, 1));
}

#[test]
fn test_daughters_fixed_shares() {
    let engine = ForwardChainingEngine::new();

    let one = engine.calculate(&FactSet::new().with(HeirClass::Daughter, 1));
    assert_eq!(one.fraction_of(&single(HeirClass::Daughter)), frac(1, 2));

    let two = engine.calculate(&FactSet::new().with(HeirClass::Daughter, 2));
    assert_eq!(two.shares.class_total(HeirClass::Daughter), frac(2, 3));
    assert_eq!(two.fraction_of(&HeirInstance::nth(HeirClass::Daughter, 1)), frac(1, 3));
    assert_eq!(two.fraction_of(&HeirInstance::nth(HeirClass::Daughter, 2)), frac(1, 3));
}

#[test]
fn test_husband_shares() {
    let engine = ForwardChainingEngine::new();

    let with_son = engine.calculate(&FactSet::new().with(HeirClass::Husband, 1).with(HeirClass::Son, 1));
    assert_eq!(with_son.fraction_of(&single(HeirClass::Husband)), frac(1, 4));
    assert_eq!(with_son.fraction_of(&single(HeirClass::Son)), frac(3, 4));

    let with_mother = engine.calculate(&FactSet::new().with(HeirClass::Husband, 1).with(HeirClass::Mother, 1));
    assert_eq!(with_mother.fraction_of(&single(HeirClass::Husband)), frac(1, 2));
    assert_eq!(with_mother.fraction_of(&single(HeirClass::Mother)), frac(1, 3));
}

#[test]
fn test_mixed_children_two_to_one() {
    let facts = FactSet::new()
        .with(HeirClass::Son, 1)
        .with(HeirClass::Daughter, 2)
        .with(HeirClass::Wife, 1);
    let result = ForwardChainingEngine::new().calculate(&facts);

    // 7/8 residue in four parts
    assert_eq!(result.fraction_of(&single(HeirClass::Wife)), frac(1, 8));
    assert_eq!(result.fraction_of(&single(HeirClass::Son)), frac(7, 16));
    assert_eq!(result.fraction_of(&HeirInstance::nth(HeirClass::Daughter, 2)), frac(7, 32));
    assert_eq!(result.residual_heirs, Some(ResidualClaim::Children));
}

#[test]
fn test_brothers_and_sisters_share_residue() {
    let facts = FactSet::new()
        .with(HeirClass::Wife, 1)
        .with(HeirClass::Brother, 1)
        .with(HeirClass::Sister, 1);
    let result = ForwardChainingEngine::new().calculate(&facts);

    // wife 1/4, mother absent, residue 3/4 split 2:1
    assert_eq!(result.fraction_of(&single(HeirClass::Brother)), frac(1, 2));
    assert_eq!(result.fraction_of(&single(HeirClass::Sister)), frac(1, 4));
    assert_eq!(result.residual_heirs, Some(ResidualClaim::Siblings));
}

#[test]
fn test_father_excludes_siblings() {
    let facts = FactSet::new().with(HeirClass::Father, 1).with(HeirClass::Brother, 2);
    let result = ForwardChainingEngine::new().calculate(&facts);
    assert_eq!(result.fraction_of(&single(HeirClass::Father)), frac(1, 1));
    assert!(!result.shares.contains(&HeirInstance::nth(HeirClass::Brother, 1)));
}

#[test]
fn test_awl_scales_proportionally() {
    let facts = FactSet::new()
        .with(HeirClass::Husband, 1)
        .with(HeirClass::Daughter, 2)
        .with(HeirClass::Mother, 1);
    let result = ForwardChainingEngine::new().calculate(&facts);

    // 1/4 + 2/3 + 1/6 = 13/12
    assert_eq!(result.awl_total, Some(frac(13, 12)));
    assert_eq!(result.shares.total(), frac(1, 1));
    assert_eq!(result.fraction_of(&single(HeirClass::Husband)), frac(3, 13));
    assert_eq!(result.fraction_of(&single(HeirClass::Mother)), frac(2, 13));
    assert_eq!(result.fraction_of(&HeirInstance::nth(HeirClass::Daughter, 1)), frac(4, 13));

    let husband = result.fraction_of(&single(HeirClass::Husband));
    let mother = result.fraction_of(&single(HeirClass::Mother));
    assert_eq!(husband / mother, frac(3, 2));
    assert!(result.applied_rules.last().unwrap().contains("'Awl"));
}

#[test]
fn test_every_family_sums_to_one_with_radd() {
    let engine = ForwardChainingEngine::new().with_surplus_policy(SurplusPolicy::ReturnToSharers);
    let families = valid_families();
    assert!(families.len() > 500);
    for facts in families {
        let result = engine.calculate(&facts);
        assert_eq!(result.shares.total(), frac(1, 1), "{:?}", facts);
        assert!(result.shares.iter().all(|(_, s)| s.fraction >= Fraction::from_integer(0)));
    }
}

#[test]
fn test_retained_surplus_only_without_residuary() {
    let engine = ForwardChainingEngine::new();
    for facts in valid_families() {
        let result = engine.calculate(&facts);
        let total = result.shares.total();
        assert!(total <= frac(1, 1), "{:?}", facts);
        if result.residual_heirs.is_some() || result.awl_total.is_some() {
            assert_eq!(total, frac(1, 1), "{:?}", facts);
        } else {
            assert_eq!(result.undistributed(), frac(1, 1) - total);
        }
    }
}

#[test]
fn test_engine_is_reusable_across_calls() {
    let engine = ForwardChainingEngine::new();
    let first = engine.calculate(&FactSet::new().with(HeirClass::Son, 1).with(HeirClass::Wife, 1));
    let second = engine.calculate(&FactSet::new().with(HeirClass::Daughter, 1));
    let again = engine.calculate(&FactSet::new().with(HeirClass::Son, 1).with(HeirClass::Wife, 1));

    assert_eq!(first, again);
    assert_eq!(second.shares.len(), 1);
}

#[test]
fn test_engine_shared_between_threads() {
    let engine = std::sync::Arc::new(ForwardChainingEngine::new());
    let handles: Vec<_> = (1..=4)
        .map(|sons| {
            let engine = engine.clone();
            std::thread::spawn(move || engine.calculate(&FactSet::new().with(HeirClass::Son, sons)))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        assert_eq!(result.shares.len(), i + 1);
        assert_eq!(result.shares.total(), frac(1, 1));
    }
}
