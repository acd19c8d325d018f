//! Plan resolution.
//!
//! A plan is selected by exactly one truthy switch variable. Each switch has a
//! prefix from which its companion variables are derived:
//!
//! | Switch | Tier | Companions |
//! |--------|------|------------|
//! | `OPEN_PLAN` | Open | `OPEN_PLAN_NAME`, `OPEN_PLAN_CHANNEL`, `OPEN_PLAN_INSTANCE` |
//! | `STANDARD_PLAN` | Standard | `STANDARD_PLAN_*` |
//! | `PAYGO_PLAN` | Standard | `PAYGO_PLAN_*` |
//! | `PREMIUM_PLAN` | Premium | `PREMIUM_PLAN_*` |
//! | `FLEX_PLAN` | Premium | `FLEX_PLAN_*` |
//! | `DEDICATED_PLAN` | Dedicated | `DEDICATED_PLAN_*` |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::env::Environment;
use crate::error::{ConnectorError, ConnectorResult};

/// Service plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Free tier.
    Open,
    /// Pay-as-you-go tier.
    Standard,
    /// Flex / premium tier.
    Premium,
    /// Dedicated system tier.
    Dedicated,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Open => "open",
            Tier::Standard => "standard",
            Tier::Premium => "premium",
            Tier::Dedicated => "dedicated",
        };
        f.write_str(s)
    }
}

/// A recognized plan switch.
#[derive(Debug, PartialEq, Eq)]
pub struct PlanSwitch {
    /// Internal key, also the lowercase variable prefix.
    pub key: &'static str,
    /// Switch variable name.
    pub var: &'static str,
    /// Tier selected by this switch.
    pub tier: Tier,
    /// Human-readable label.
    pub label: &'static str,
}

impl PlanSwitch {
    /// `<PREFIX>_PLAN_NAME`
    pub fn name_var(&self) -> String {
        format!("{}_NAME", self.var)
    }

    /// `<PREFIX>_PLAN_CHANNEL`
    pub fn channel_var(&self) -> String {
        format!("{}_CHANNEL", self.var)
    }

    /// `<PREFIX>_PLAN_INSTANCE`
    pub fn instance_var(&self) -> String {
        format!("{}_INSTANCE", self.var)
    }
}

/// Every switch the resolver understands, in reporting order.
pub const PLAN_SWITCHES: &[PlanSwitch] = &[
    PlanSwitch {
        key: "open",
        var: "OPEN_PLAN",
        tier: Tier::Open,
        label: "Open Plan",
    },
    PlanSwitch {
        key: "standard",
        var: "STANDARD_PLAN",
        tier: Tier::Standard,
        label: "Standard Plan",
    },
    PlanSwitch {
        key: "paygo",
        var: "PAYGO_PLAN",
        tier: Tier::Standard,
        label: "Pay-As-You-Go Plan",
    },
    PlanSwitch {
        key: "premium",
        var: "PREMIUM_PLAN",
        tier: Tier::Premium,
        label: "Premium Plan",
    },
    PlanSwitch {
        key: "flex",
        var: "FLEX_PLAN",
        tier: Tier::Premium,
        label: "Flex Plan",
    },
    PlanSwitch {
        key: "dedicated",
        var: "DEDICATED_PLAN",
        tier: Tier::Dedicated,
        label: "Dedicated Plan",
    },
];

/// Look up a switch by its internal key (case-insensitive).
pub fn switch_for_key(key: &str) -> Option<&'static PlanSwitch> {
    PLAN_SWITCHES
        .iter()
        .find(|s| s.key.eq_ignore_ascii_case(key.trim()))
}

/// "OPEN_PLAN, STANDARD_PLAN, ... or DEDICATED_PLAN"
fn recognized_switches() -> String {
    let vars: Vec<&str> = PLAN_SWITCHES.iter().map(|s| s.var).collect();
    match vars.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        Some((last, _)) => (*last).to_string(),
        None => String::new(),
    }
}

/// The single active plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
    switch: &'static PlanSwitch,
    name: String,
}

impl ResolvedPlan {
    /// The switch that selected this plan.
    pub fn switch(&self) -> &'static PlanSwitch {
        self.switch
    }

    /// Tier of the plan.
    pub fn tier(&self) -> Tier {
        self.switch.tier
    }

    /// Display label (e.g. "Open Plan").
    pub fn label(&self) -> &'static str {
        self.switch.label
    }

    /// Internal key used to look up credentials (e.g. "open").
    pub fn key(&self) -> &'static str {
        self.switch.key
    }

    /// Value of the `<PREFIX>_PLAN_NAME` companion.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResolvedPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.name)
    }
}

/// Determine the active plan.
///
/// Fails when the number of truthy switches is not exactly one, or when the
/// active switch has no `<PREFIX>_PLAN_NAME` companion.
pub fn resolve_plan(env: &Environment) -> ConnectorResult<ResolvedPlan> {
    let active: Vec<&'static PlanSwitch> = PLAN_SWITCHES
        .iter()
        .filter(|s| env.is_enabled(s.var))
        .collect();

    let switch = match active.as_slice() {
        [single] => *single,
        [] => {
            return Err(ConnectorError::Configuration(format!(
                "Exactly one of {} must be set to a truthy value (on/true/1/yes); none is set",
                recognized_switches()
            )));
        }
        many => {
            let found: Vec<&str> = many.iter().map(|s| s.var).collect();
            return Err(ConnectorError::Configuration(format!(
                "Exactly one of {} must be set to a truthy value (on/true/1/yes); found {}: {}",
                recognized_switches(),
                found.len(),
                found.join(", ")
            )));
        }
    };

    let name_var = switch.name_var();
    let name = env.get_non_empty(&name_var).ok_or_else(|| {
        ConnectorError::Configuration(format!(
            "{name_var} must be set when {} is enabled",
            switch.var
        ))
    })?;

    tracing::debug!(plan = switch.key, name, "resolved plan");

    Ok(ResolvedPlan {
        switch,
        name: name.to_string(),
    })
}

/// Plan query form: the display label of the active plan.
pub fn plan_label(env: &Environment) -> ConnectorResult<&'static str> {
    resolve_plan(env).map(|p| p.label())
}

/// Credentials query form: the internal key of the active plan.
pub fn plan_key(env: &Environment) -> ConnectorResult<&'static str> {
    resolve_plan(env).map(|p| p.key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_env() -> Environment {
        Environment::from_pairs([("OPEN_PLAN", "on"), ("OPEN_PLAN_NAME", "test-open")])
    }

    #[test]
    fn test_resolve_open_plan() {
        let plan = resolve_plan(&open_env()).unwrap();
        assert_eq!(plan.tier(), Tier::Open);
        assert_eq!(plan.key(), "open");
        assert_eq!(plan.label(), "Open Plan");
        assert_eq!(plan.name(), "test-open");
    }

    #[test]
    fn test_no_plan_set() {
        let err = resolve_plan(&Environment::default()).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, ConnectorError::Configuration(_)));
        assert!(msg.contains("Exactly one of"));
        for switch in PLAN_SWITCHES {
            assert!(msg.contains(switch.var), "message should name {}", switch.var);
        }
    }

    #[test]
    fn test_falsy_switch_is_inactive() {
        let env = Environment::from_pairs([("OPEN_PLAN", "off"), ("OPEN_PLAN_NAME", "x")]);
        assert!(resolve_plan(&env).is_err());
    }

    #[test]
    fn test_two_plans_set() {
        let env = open_env()
            .with("PREMIUM_PLAN", "true")
            .with("PREMIUM_PLAN_NAME", "prem");
        let err = resolve_plan(&env).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("found 2"));
        assert!(msg.contains("OPEN_PLAN, PREMIUM_PLAN"));
    }

    #[test]
    fn test_alias_and_canonical_both_set() {
        let env = Environment::from_pairs([
            ("STANDARD_PLAN", "on"),
            ("STANDARD_PLAN_NAME", "std"),
            ("PAYGO_PLAN", "on"),
            ("PAYGO_PLAN_NAME", "paygo"),
        ]);
        assert!(matches!(
            resolve_plan(&env),
            Err(ConnectorError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_name() {
        let env = Environment::from_pairs([("OPEN_PLAN", "on")]);
        let err = resolve_plan(&env).unwrap_err();
        assert!(err.to_string().contains("OPEN_PLAN_NAME must be set"));
    }

    #[test]
    fn test_blank_name_counts_as_missing() {
        let env = Environment::from_pairs([("FLEX_PLAN", "1"), ("FLEX_PLAN_NAME", "   ")]);
        let err = resolve_plan(&env).unwrap_err();
        assert!(err.to_string().contains("FLEX_PLAN_NAME"));
    }

    #[test]
    fn test_alias_switches_map_to_tiers() {
        let env = Environment::from_pairs([("PAYGO_PLAN", "yes"), ("PAYGO_PLAN_NAME", "p")]);
        let plan = resolve_plan(&env).unwrap();
        assert_eq!(plan.tier(), Tier::Standard);
        assert_eq!(plan.key(), "paygo");

        let env = Environment::from_pairs([("FLEX_PLAN", "yes"), ("FLEX_PLAN_NAME", "f")]);
        assert_eq!(resolve_plan(&env).unwrap().tier(), Tier::Premium);
    }

    #[test]
    fn test_query_forms() {
        let env = Environment::from_pairs([
            ("DEDICATED_PLAN", "on"),
            ("DEDICATED_PLAN_NAME", "lab"),
        ]);
        assert_eq!(plan_label(&env).unwrap(), "Dedicated Plan");
        assert_eq!(plan_key(&env).unwrap(), "dedicated");
    }

    #[test]
    fn test_switch_for_key() {
        assert_eq!(switch_for_key("OPEN").map(|s| s.var), Some("OPEN_PLAN"));
        assert_eq!(switch_for_key("flex").map(|s| s.tier), Some(Tier::Premium));
        assert!(switch_for_key("enterprise").is_none());
    }

    #[test]
    fn test_companion_var_names() {
        let switch = switch_for_key("premium").unwrap();
        assert_eq!(switch.name_var(), "PREMIUM_PLAN_NAME");
        assert_eq!(switch.channel_var(), "PREMIUM_PLAN_CHANNEL");
        assert_eq!(switch.instance_var(), "PREMIUM_PLAN_INSTANCE");
    }

    fn truthy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["on", "ON", "true", "True", "1", "yes", "YES"])
    }

    proptest! {
        #[test]
        fn prop_single_switch_with_name_resolves(
            idx in 0..PLAN_SWITCHES.len(),
            value in truthy(),
            name in "[a-z][a-z0-9-]{0,15}",
        ) {
            let switch = &PLAN_SWITCHES[idx];
            let env = Environment::from_pairs([
                (switch.var.to_string(), value.to_string()),
                (switch.name_var(), name.clone()),
            ]);
            let plan = resolve_plan(&env).unwrap();
            prop_assert!(!plan.label().is_empty());
            prop_assert_eq!(plan.key(), switch.key);
            prop_assert_eq!(plan.name(), name.as_str());
        }

        #[test]
        fn prop_zero_or_many_switches_fail(
            mask in 0u8..(1 << PLAN_SWITCHES.len()),
            value in truthy(),
        ) {
            prop_assume!(mask.count_ones() != 1);
            let mut env = Environment::default();
            for (i, switch) in PLAN_SWITCHES.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    env = env.with(switch.var, value).with(switch.name_var(), "n");
                }
            }
            prop_assert!(matches!(
                resolve_plan(&env),
                Err(ConnectorError::Configuration(_))
            ));
        }
    }
}
