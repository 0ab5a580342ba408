use super::*;
use crate::animation::ease::Ease;
use crate::node::builtin::NodeDef;

fn rig(id: u32) -> RigDescriptor {
    RigDescriptor::new(RigId(id), format!("rig{id}"), NodeDef::Sequence(vec![]))
}

#[test]
fn unconditional_rule_always_matches() {
    let (a, b) = (rig(1), rig(2));
    let m = TransitionMatch {
        from_rig: &a,
        from_asset: None,
        from_frozen: false,
        to_rig: &b,
        to_asset: None,
    };
    assert!(TransitionRule::new("cut", None).all_conditions_match(&m));
}

#[test]
fn rig_and_asset_conditions() {
    let (a, b) = (rig(1), rig(2));
    let asset = CameraAsset::new(AssetId(7), "asset");
    let m = TransitionMatch {
        from_rig: &a,
        from_asset: Some(&asset),
        from_frozen: true,
        to_rig: &b,
        to_asset: Some(&asset),
    };

    let rule = TransitionRule::new(
        "ease",
        Some(BlendDef::Simple {
            duration_secs: 1.0,
            ease: Ease::SmoothStep,
        }),
    )
    .when(TransitionCondition::IsRig {
        from: Some(RigId(1)),
        to: None,
    })
    .when(TransitionCondition::SameAsset)
    .when(TransitionCondition::FromFrozen(true));
    assert!(rule.all_conditions_match(&m));

    let wrong = TransitionRule::new("x", None).when(TransitionCondition::IsRig {
        from: None,
        to: Some(RigId(1)),
    });
    assert!(!wrong.all_conditions_match(&m));

    let missing_asset = TransitionCondition::IsAsset {
        from: Some(AssetId(7)),
        to: None,
    };
    let m_no_asset = TransitionMatch {
        from_asset: None,
        ..m
    };
    assert!(missing_asset.matches(&m));
    assert!(!missing_asset.matches(&m_no_asset));
}

#[test]
fn combinators() {
    let (a, b) = (rig(1), rig(2));
    let m = TransitionMatch {
        from_rig: &a,
        from_asset: None,
        from_frozen: false,
        to_rig: &b,
        to_asset: None,
    };
    let not_frozen = TransitionCondition::Not(Box::new(TransitionCondition::FromFrozen(true)));
    assert!(not_frozen.matches(&m));
    let any = TransitionCondition::AnyOf(vec![
        TransitionCondition::SameAsset,
        TransitionCondition::IsRig {
            from: None,
            to: Some(RigId(2)),
        },
    ]);
    assert!(any.matches(&m));
    assert!(!TransitionCondition::SameAsset.matches(&m));
}

#[test]
fn rules_deserialize_from_json() {
    let rule: TransitionRule = serde_json::from_str(
        r#"{
            "name": "to-aim",
            "conditions": [{ "IsRig": { "to": 4 } }],
            "blend": { "Simple": { "duration_secs": 0.5, "ease": "InOutCubic" } },
            "allow_rig_merging": true
        }"#,
    )
    .unwrap();
    assert!(rule.allow_rig_merging);
    assert_eq!(
        rule.conditions,
        vec![TransitionCondition::IsRig {
            from: None,
            to: Some(RigId(4))
        }]
    );
}
