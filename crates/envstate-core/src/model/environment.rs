//! Environment definitions and label-based selection

use super::group::Group;
use crate::error::{EnvError, Result};
use crate::template::Variables;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Every environment declared in one document plus its variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSet {
    #[serde(rename = "environment", default)]
    pub environments: Vec<Environment>,

    #[serde(rename = "variable", default)]
    pub variables: Variables,
}

/// A named, labeled topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,

    /// Comma-separated tags
    #[serde(default)]
    pub label: String,

    #[serde(rename = "group", default)]
    pub groups: Vec<Group>,
}

impl Environment {
    /// Whether every comma-separated token of `label` is one of this
    /// environment's tokens. An empty expression matches everything.
    pub fn check_label(&self, label: &str) -> bool {
        if label.is_empty() {
            return true;
        }

        if self.label.is_empty() {
            return false;
        }

        let tokens: HashSet<&str> = self.label.split(',').collect();
        label.split(',').all(|wanted| tokens.contains(wanted))
    }

    pub fn instance_count(&self) -> usize {
        self.groups.iter().map(|g| g.instances().len()).sum()
    }
}

impl EnvironmentSet {
    /// First environment named `name` whose labels satisfy `label`.
    pub fn resolve(&self, name: &str, label: &str) -> Result<&Environment> {
        self.environments
            .iter()
            .find(|env| env.name == name && env.check_label(label))
            .ok_or_else(|| EnvError::EnvironmentNotFound {
                name: name.to_string(),
                label: label.to_string(),
            })
    }

    /// Every environment whose labels satisfy `label`, in declaration order.
    pub fn resolve_all(&self, label: &str) -> Vec<&Environment> {
        self.environments
            .iter()
            .filter(|env| env.check_label(label))
            .collect()
    }

    /// Resolve a selection into its target environments.
    ///
    /// Unlike [`resolve_all`](Self::resolve_all), an empty result is an
    /// error here, telling apart an empty document from a label that
    /// matched nothing.
    pub fn select(&self, selection: &crate::Selection) -> Result<Vec<&Environment>> {
        match &selection.target {
            crate::Target::Named(name) => Ok(vec![self.resolve(name, &selection.label)?]),
            crate::Target::All => {
                let matched = self.resolve_all(&selection.label);
                if !matched.is_empty() {
                    Ok(matched)
                } else if self.environments.is_empty() {
                    Err(EnvError::NoEnvironments)
                } else {
                    Err(EnvError::NoLabelMatch(selection.label.clone()))
                }
            }
        }
    }

    /// Names must be present and unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for env in &self.environments {
            if env.name.is_empty() {
                return Err(EnvError::InvalidConfig(
                    "environment without a name".to_string(),
                ));
            }
            if !seen.insert(env.name.as_str()) {
                return Err(EnvError::InvalidConfig(format!(
                    "environment {:?} is declared more than once",
                    env.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Selection, Target};

    fn env(name: &str, label: &str) -> Environment {
        Environment {
            name: name.to_string(),
            label: label.to_string(),
            groups: vec![],
        }
    }

    fn set(envs: Vec<Environment>) -> EnvironmentSet {
        EnvironmentSet {
            environments: envs,
            ..Default::default()
        }
    }

    #[test]
    fn test_check_label_empty_expression_matches_everything() {
        assert!(env("a", "").check_label(""));
        assert!(env("a", "dev,us").check_label(""));
    }

    #[test]
    fn test_check_label_empty_environment_label() {
        assert!(!env("a", "").check_label("dev"));
    }

    #[test]
    fn test_check_label_is_token_based_not_substring() {
        let e = env("a", "development,us-east");
        assert!(!e.check_label("dev"));
        assert!(!e.check_label("us"));
        assert!(e.check_label("us-east,development"));
    }

    #[test]
    fn test_check_label_requires_every_token() {
        let e = env("a", "dev,us");
        assert!(e.check_label("dev"));
        assert!(e.check_label("us,dev"));
        assert!(!e.check_label("dev,eu"));
    }

    #[test]
    fn test_resolve_all_keeps_declaration_order() {
        let envs = set(vec![
            env("first", "dev,us"),
            env("second", "dev"),
            env("third", "dev,us,canary"),
        ]);

        let names: Vec<_> = envs
            .resolve_all("dev,us")
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "third"]);
    }

    #[test]
    fn test_resolve_all_no_match_is_empty() {
        let envs = set(vec![env("a", "dev")]);
        assert!(envs.resolve_all("prod").is_empty());
    }

    #[test]
    fn test_resolve_agrees_with_resolve_all() {
        let envs = set(vec![
            env("api", "dev"),
            env("api", "prod,us"),
            env("db", "prod"),
        ]);

        for label in ["", "dev", "prod", "prod,us", "us", "eu"] {
            for name in ["api", "db", "missing"] {
                let via_all = envs
                    .resolve_all(label)
                    .into_iter()
                    .find(|e| e.name == name);
                let via_resolve = envs.resolve(name, label).ok();
                assert_eq!(via_all, via_resolve, "name={name} label={label}");
            }
        }
    }

    #[test]
    fn test_resolve_not_found() {
        let envs = set(vec![env("api", "dev")]);
        let err = envs.resolve("api", "prod").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("\"api\""));
        assert!(err.to_string().contains("\"prod\""));
    }

    #[test]
    fn test_select_distinguishes_empty_document_from_no_match() {
        let all_prod = Selection {
            target: Target::All,
            label: "prod".to_string(),
        };

        let empty = set(vec![]);
        assert!(matches!(
            empty.select(&all_prod),
            Err(EnvError::NoEnvironments)
        ));

        let envs = set(vec![env("a", "dev")]);
        assert!(matches!(
            envs.select(&all_prod),
            Err(EnvError::NoLabelMatch(label)) if label == "prod"
        ));
    }

    #[test]
    fn test_select_named() {
        let envs = set(vec![env("a", "dev"), env("b", "dev")]);
        let selected = envs
            .select(&Selection {
                target: Target::Named("b".to_string()),
                label: String::new(),
            })
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "b");
    }

    #[test]
    fn test_validate_rejects_duplicates_and_empty_names() {
        assert!(set(vec![env("a", ""), env("b", "")]).validate().is_ok());
        assert!(matches!(
            set(vec![env("a", ""), env("a", "dev")]).validate(),
            Err(EnvError::InvalidConfig(_))
        ));
        assert!(matches!(
            set(vec![env("", "")]).validate(),
            Err(EnvError::InvalidConfig(_))
        ));
    }
}
