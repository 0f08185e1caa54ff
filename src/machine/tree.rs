//! Flattened, validated state tree.
//!
//! [`StateNode`] trees are convenient to write but awkward to walk upward,
//! so the machine flattens them into an arena where every slot knows its
//! parent, its children and its absolute path. Slot 0 is always the root.
//!
//! Validation uses `Validation` so every structural problem is reported at
//! once instead of one per build attempt.

use super::transition::{Target, Transition};
use crate::core::{ConfigurationError, StateBehavior, StateNode, StatePath};
use std::collections::BTreeSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Checked = Validation<(), NonEmptyVec<ConfigurationError>>;

pub(crate) const ROOT: usize = 0;

pub(crate) struct StateSlot {
    pub(crate) name: String,
    pub(crate) path: StatePath,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) initial: Option<usize>,
    pub(crate) behavior: Box<dyn StateBehavior>,
    pub(crate) guidance_modes: BTreeSet<String>,
}

pub(crate) struct StateTree {
    slots: Vec<StateSlot>,
}

impl StateTree {
    /// Validate and flatten `root`.
    pub(crate) fn build(root: StateNode) -> Result<Self, Vec<ConfigurationError>> {
        into_result(check_node(&root, &StatePath::root()))?;

        let mut tree = Self { slots: Vec::new() };
        tree.flatten(root, None, StatePath::root());
        Ok(tree)
    }

    fn flatten(&mut self, node: StateNode, parent: Option<usize>, path: StatePath) -> usize {
        let StateNode {
            name,
            children,
            initial,
            behavior,
            guidance_modes,
        } = node;

        let index = self.slots.len();
        self.slots.push(StateSlot {
            name,
            path: path.clone(),
            parent,
            children: Vec::new(),
            initial: None,
            behavior,
            guidance_modes,
        });

        for child in children {
            let child_path = path.child(&child.name);
            let is_initial = initial.as_deref() == Some(child.name.as_str());
            let child_index = self.flatten(child, Some(index), child_path);
            self.slots[index].children.push(child_index);
            if is_initial {
                self.slots[index].initial = Some(child_index);
            }
        }
        index
    }

    pub(crate) fn slot(&self, index: usize) -> &StateSlot {
        &self.slots[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut StateSlot {
        &mut self.slots[index]
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = &StateSlot> {
        self.slots.iter()
    }

    /// Look up the slot at an absolute path. The empty path is the root.
    pub(crate) fn resolve(&self, path: &StatePath) -> Option<usize> {
        path.segments().iter().try_fold(ROOT, |index, segment| {
            self.slots[index]
                .children
                .iter()
                .copied()
                .find(|&child| self.slots[child].name == *segment)
        })
    }

    /// Slots from the root down to `index`, inclusive.
    pub(crate) fn ancestry(&self, index: usize) -> Vec<usize> {
        let mut chain = vec![index];
        let mut current = index;
        while let Some(parent) = self.slots[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Full active chain for a target: its ancestry followed by the
    /// `initial` descent down to a leaf.
    pub(crate) fn activation_chain(&self, index: usize) -> Vec<usize> {
        let mut chain = self.ancestry(index);
        let mut current = index;
        while let Some(initial) = self.slots[current].initial {
            chain.push(initial);
            current = initial;
        }
        chain
    }

    /// True when some state's path ends with `pattern`.
    pub(crate) fn matches_any(&self, pattern: &StatePath) -> bool {
        !pattern.is_empty() && self.slots.iter().any(|slot| slot.path.ends_with(pattern))
    }

    /// Check a transition table against this tree, resolving each
    /// `Target::Path` to its slot.
    pub(crate) fn resolve_transitions(
        &self,
        transitions: &[Transition],
    ) -> Result<Vec<Option<usize>>, Vec<ConfigurationError>> {
        let checks: Vec<Checked> = transitions
            .iter()
            .enumerate()
            .map(|(index, transition)| self.check_transition(index, transition))
            .collect();
        into_result(Validation::all_vec(checks).map(|_| ()))?;

        Ok(transitions
            .iter()
            .map(|transition| match &transition.target {
                Target::Path(target) => self.resolve(target),
                Target::Stay => None,
            })
            .collect())
    }

    fn check_transition(&self, index: usize, transition: &Transition) -> Checked {
        let trigger = transition.trigger.as_str();
        if trigger.is_empty() {
            return Validation::fail(ConfigurationError::EmptyTrigger { index });
        }

        let mut checks = vec![self.check_source(index, trigger, &transition.source)];
        if let Target::Path(target) = &transition.target {
            checks.push(self.check_target(index, trigger, target));
        }
        Validation::all_vec(checks).map(|_| ())
    }

    fn check_source(&self, index: usize, trigger: &str, source: &StatePath) -> Checked {
        if source.is_empty() || source.has_empty_segment() {
            Validation::fail(ConfigurationError::InvalidPath {
                index,
                trigger: trigger.to_string(),
                path: source.clone(),
            })
        } else if !self.matches_any(source) {
            Validation::fail(ConfigurationError::UnresolvedSource {
                index,
                trigger: trigger.to_string(),
                source_path: source.clone(),
            })
        } else {
            Validation::success(())
        }
    }

    fn check_target(&self, index: usize, trigger: &str, target: &StatePath) -> Checked {
        if target.is_empty() || target.has_empty_segment() {
            Validation::fail(ConfigurationError::InvalidPath {
                index,
                trigger: trigger.to_string(),
                path: target.clone(),
            })
        } else if self.resolve(target).is_none() {
            Validation::fail(ConfigurationError::UnresolvedTarget {
                index,
                trigger: trigger.to_string(),
                target: target.clone(),
            })
        } else {
            Validation::success(())
        }
    }
}

fn check_node(node: &StateNode, path: &StatePath) -> Checked {
    let mut checks: Vec<Checked> = Vec::new();
    let mut seen = BTreeSet::new();

    for child in node.children() {
        if child.name().is_empty() {
            checks.push(Validation::fail(ConfigurationError::EmptyName {
                parent: path.clone(),
            }));
            continue;
        }
        // A name is exactly one path segment.
        if child.name().trim().is_empty() || child.name().contains('.') {
            checks.push(Validation::fail(ConfigurationError::InvalidName {
                parent: path.clone(),
                name: child.name().to_string(),
            }));
            continue;
        }
        if !seen.insert(child.name()) {
            checks.push(Validation::fail(ConfigurationError::DuplicateChild {
                parent: path.clone(),
                name: child.name().to_string(),
            }));
        }
        checks.push(check_node(child, &path.child(child.name())));
    }

    if !node.is_leaf() {
        checks.push(match node.initial() {
            None => Validation::fail(ConfigurationError::MissingInitial { state: path.clone() }),
            Some(initial) if node.child(initial).is_none() => {
                Validation::fail(ConfigurationError::UnknownInitial {
                    state: path.clone(),
                    initial: initial.to_string(),
                })
            }
            Some(_) => Validation::success(()),
        });
    }

    Validation::all_vec(checks).map(|_| ())
}

fn into_result(checked: Checked) -> Result<(), Vec<ConfigurationError>> {
    match checked {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mission() -> StateNode {
        StateNode::new("hello")
            .with_initial("ground")
            .with_child(
                StateNode::new("ground")
                    .with_initial("idle")
                    .with_children([StateNode::new("idle"), StateNode::new("say")]),
            )
            .with_child(StateNode::new("flying"))
    }

    #[test]
    fn flatten_assigns_paths() {
        let tree = StateTree::build(mission()).unwrap();
        let paths: Vec<String> = tree.slots().map(|s| s.path.to_string()).collect();
        assert_eq!(paths, ["", "ground", "ground.idle", "ground.say", "flying"]);
        assert_eq!(tree.slot(ROOT).name, "hello");
        assert_eq!(tree.slots().count(), 5);
    }

    #[test]
    fn resolve_absolute_paths() {
        let tree = StateTree::build(mission()).unwrap();
        assert_eq!(tree.resolve(&StatePath::root()), Some(ROOT));
        assert_eq!(tree.resolve(&StatePath::from("ground.say")), Some(3));
        assert_eq!(tree.resolve(&StatePath::from("say")), None);
        assert_eq!(tree.resolve(&StatePath::from("ground.say.deeper")), None);
    }

    #[test]
    fn activation_chain_descends_initials() {
        let tree = StateTree::build(mission()).unwrap();
        let ground = tree.resolve(&StatePath::from("ground")).unwrap();
        assert_eq!(tree.activation_chain(ground), [0, 1, 2]);
        assert_eq!(tree.activation_chain(ROOT), [0, 1, 2]);
        assert_eq!(tree.ancestry(3), [0, 1, 3]);
    }

    #[test]
    fn structural_errors_accumulate() {
        let root = StateNode::new("m")
            .with_child(StateNode::new("a").with_child(StateNode::new("x")))
            .with_child(StateNode::new("a"))
            .with_child(StateNode::new(""));

        let errors = match StateTree::build(root) {
            Err(errors) => errors,
            Ok(_) => panic!("expected configuration errors"),
        };

        assert!(errors.contains(&ConfigurationError::MissingInitial {
            state: StatePath::root()
        }));
        assert!(errors.contains(&ConfigurationError::MissingInitial {
            state: StatePath::from("a")
        }));
        assert!(errors.contains(&ConfigurationError::DuplicateChild {
            parent: StatePath::root(),
            name: "a".to_string()
        }));
        assert!(errors.contains(&ConfigurationError::EmptyName {
            parent: StatePath::root()
        }));
    }

    #[test]
    fn names_must_be_single_segments() {
        let root = StateNode::new("m")
            .with_initial("ground")
            .with_child(
                StateNode::new("ground")
                    .with_initial("idle")
                    .with_child(StateNode::new("idle")),
            )
            .with_child(StateNode::new("ground.idle"))
            .with_child(StateNode::new("  "));

        let errors = StateTree::build(root).err().unwrap();
        assert_eq!(
            errors,
            [
                ConfigurationError::InvalidName {
                    parent: StatePath::root(),
                    name: "ground.idle".to_string()
                },
                ConfigurationError::InvalidName {
                    parent: StatePath::root(),
                    name: "  ".to_string()
                },
            ]
        );
    }

    #[test]
    fn unknown_initial_is_reported() {
        let root = StateNode::new("m")
            .with_initial("sleep")
            .with_child(StateNode::new("awake"));
        let errors = StateTree::build(root).err().unwrap();
        assert_eq!(
            errors,
            [ConfigurationError::UnknownInitial {
                state: StatePath::root(),
                initial: "sleep".to_string()
            }]
        );
    }

    #[test]
    fn transition_errors_accumulate() {
        let tree = StateTree::build(mission()).unwrap();
        let table = [
            Transition::to("say", "ground.idle", "ground.say"),
            Transition::to("", "idle", "ground"),
            Transition::to("land", "landing", "ground"),
            Transition::to("go", "idle", "ground.nowhere"),
            Transition::to("bad", "ground..idle", "ground"),
        ];

        let errors = tree.resolve_transitions(&table).err().unwrap();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ConfigurationError::EmptyTrigger { index: 1 }));
        assert!(matches!(errors[1], ConfigurationError::UnresolvedSource { index: 2, .. }));
        assert!(matches!(errors[2], ConfigurationError::UnresolvedTarget { index: 3, .. }));
        assert!(matches!(errors[3], ConfigurationError::InvalidPath { index: 4, .. }));
    }

    #[test]
    fn resolved_targets_line_up_with_table() {
        let tree = StateTree::build(mission()).unwrap();
        let table = [
            Transition::to("say", "idle", "ground.say"),
            Transition::stay("count", "say"),
        ];
        assert_eq!(tree.resolve_transitions(&table).unwrap(), [Some(3), None]);
    }
}
