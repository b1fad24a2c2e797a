// Copyright 2025 Cowboy AI, LLC.

//! View extension merging
//!
//! Extensions for a region are concatenated across layers, stably sorted by
//! ascending priority (contribution order breaks ties) and deduplicated by
//! id. A duplicate id keeps the list position of its first occurrence and
//! takes the content of its latest contribution, except for `priority`: the
//! surviving entry keeps the priority of the slot it occupies, so layers that
//! never mention the id do not move it.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{fold, fold_all, ArtifactKind, Fold, Layer, MergeOutcome, MergeWarning};
use crate::definition::{ViewExtension, ViewExtensions};

/// Warning code emitted when a later layer replaces an extension's content
pub const VIEW_EXTENSION_REPLACED: &str = "VIEW_EXTENSION_REPLACED";

#[derive(Debug, Default)]
struct ViewExtensionsFold {
    result: ViewExtensions,
    warnings: Vec<MergeWarning>,
    owners: IndexMap<String, String>,
}

fn owner_key(region: &str, id: &str) -> String {
    format!("{region}/{id}")
}

struct Entry {
    seq: usize,
    source: String,
    extension: ViewExtension,
}

impl ViewExtensionsFold {
    fn merge_region(&mut self, region: &str, source: &str, incoming: &[ViewExtension]) {
        let existing = self
            .result
            .get_mut(region)
            .map(std::mem::take)
            .unwrap_or_default();

        let mut entries: Vec<Entry> = existing
            .into_iter()
            .map(|extension| {
                let source = self
                    .owners
                    .get(&owner_key(region, &extension.id))
                    .cloned()
                    .unwrap_or_default();
                (source, extension)
            })
            .chain(incoming.iter().map(|e| (source.to_string(), e.clone())))
            .enumerate()
            .map(|(seq, (source, extension))| Entry {
                seq,
                source,
                extension,
            })
            .collect();

        // stable: equal priorities keep contribution order
        entries.sort_by_key(|entry| entry.extension.effective_priority());

        let mut merged: Vec<Entry> = Vec::with_capacity(entries.len());
        let mut position: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            match position.get(&entry.extension.id).copied() {
                Some(idx) => {
                    let slot = &mut merged[idx];
                    let (earlier, later) = if entry.seq > slot.seq {
                        (&*slot, &entry)
                    } else {
                        (&entry, &*slot)
                    };
                    if earlier.extension != later.extension {
                        self.warnings.push(MergeWarning {
                            code: VIEW_EXTENSION_REPLACED.to_string(),
                            artifact: ArtifactKind::ViewExtensions,
                            field: owner_key(region, &entry.extension.id),
                            message: format!(
                                "View extension '{}' in region '{region}' from '{}' replaced by '{}'",
                                entry.extension.id, earlier.source, later.source
                            ),
                            sources: vec![earlier.source.clone(), later.source.clone()],
                        });
                    }
                    if entry.seq > slot.seq {
                        // the slot's sort key survives so later layers sort it in place
                        let priority = slot.extension.priority;
                        *slot = entry;
                        slot.extension.priority = priority;
                    }
                }
                None => {
                    position.insert(entry.extension.id.clone(), merged.len());
                    merged.push(entry);
                }
            }
        }

        for entry in &merged {
            self.owners
                .insert(owner_key(region, &entry.extension.id), entry.source.clone());
        }

        // entry() keeps the region where it first appeared
        *self.result.entry(region.to_string()).or_default() =
            merged.into_iter().map(|entry| entry.extension).collect();
    }
}

impl Fold<ViewExtensions> for ViewExtensionsFold {
    fn apply(&mut self, layer: Layer<'_, ViewExtensions>) {
        for (region, incoming) in layer.fragment {
            self.merge_region(region, layer.source, incoming);
        }
    }

    fn finish(self) -> MergeOutcome<ViewExtensions> {
        MergeOutcome {
            result: self.result,
            collisions: Vec::new(),
            warnings: self.warnings,
            owners: self.owners,
        }
    }
}

/// Merge view extension overlays onto a base, in order
pub fn merge_view_extensions(
    base: Layer<'_, ViewExtensions>,
    overlays: &[Layer<'_, ViewExtensions>],
) -> MergeOutcome<ViewExtensions> {
    fold::<ViewExtensions, ViewExtensionsFold>(base, overlays)
}

/// Merge an ordered list of view extension layers; the first one is the base
pub fn merge_multiple_view_extensions(
    layers: &[Layer<'_, ViewExtensions>],
) -> MergeOutcome<ViewExtensions> {
    fold_all::<ViewExtensions, ViewExtensionsFold>(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn region(name: &str, extensions: Vec<ViewExtension>) -> ViewExtensions {
        ViewExtensions::from([(name.to_string(), extensions)])
    }

    fn ids(out: &MergeOutcome<ViewExtensions>, region: &str) -> Vec<String> {
        out.result[region].iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn sorted_by_ascending_priority() {
        let base = ViewExtensions::new();
        let a = region("main", vec![ViewExtension::new("x", "X").with_priority(60)]);
        let b = region("main", vec![ViewExtension::new("y", "Y").with_priority(40)]);

        let out = merge_view_extensions(
            Layer::new("object:User", &base),
            &[Layer::new("A", &a), Layer::new("B", &b)],
        );

        assert_eq!(ids(&out, "main"), vec!["y", "x"]);
    }

    #[test]
    fn equal_priority_keeps_contribution_order() {
        let base = region("main", vec![ViewExtension::new("header", "Header")]);
        let a = region("main", vec![ViewExtension::new("badge", "Badge")]);
        let b = region(
            "main",
            vec![
                ViewExtension::new("first", "First").with_priority(10),
                ViewExtension::new("footer", "Footer"),
            ],
        );

        let out = merge_view_extensions(
            Layer::new("object:User", &base),
            &[Layer::new("A", &a), Layer::new("B", &b)],
        );

        assert_eq!(ids(&out, "main"), vec!["first", "header", "badge", "footer"]);
    }

    #[test]
    fn duplicate_id_keeps_first_position_and_latest_content() {
        let a = region(
            "main",
            vec![
                ViewExtension::new("status", "Badge").with_priority(20),
                ViewExtension::new("title", "Title").with_priority(30),
            ],
        );
        let b = region(
            "main",
            vec![ViewExtension::new("status", "ColorBadge")
                .with_priority(20)
                .with_prop("tone", json!("success"))],
        );

        let out = merge_view_extensions(Layer::new("A", &a), &[Layer::new("B", &b)]);

        assert_eq!(ids(&out, "main"), vec!["status", "title"]);
        assert_eq!(out.result["main"][0].component, "ColorBadge");
        assert_eq!(out.owners["main/status"], "B");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, VIEW_EXTENSION_REPLACED);
        assert_eq!(out.warnings[0].sources, vec!["A", "B"]);
    }

    #[test]
    fn duplicate_with_lower_priority_takes_its_own_slot_and_content() {
        let a = region("main", vec![ViewExtension::new("x", "Old").with_priority(60)]);
        let b = region("main", vec![ViewExtension::new("x", "New").with_priority(40)]);

        let out = merge_view_extensions(Layer::new("A", &a), &[Layer::new("B", &b)]);

        assert_eq!(out.result["main"].len(), 1);
        assert_eq!(out.result["main"][0].component, "New");
    }

    #[test]
    fn replaced_extension_stays_put_when_later_layers_resort() {
        let a = region(
            "main",
            vec![
                ViewExtension::new("x", "Old").with_priority(10),
                ViewExtension::new("y", "Y").with_priority(20),
            ],
        );
        let b = region("main", vec![ViewExtension::new("x", "New").with_priority(30)]);
        let c = region("main", vec![ViewExtension::new("z", "Z").with_priority(25)]);

        let ab = merge_view_extensions(Layer::new("A", &a), &[Layer::new("B", &b)]);
        assert_eq!(ids(&ab, "main"), vec!["x", "y"]);

        let abc = merge_multiple_view_extensions(&[
            Layer::new("A", &a),
            Layer::new("B", &b),
            Layer::new("C", &c),
        ]);
        assert_eq!(ids(&abc, "main"), vec!["x", "y", "z"]);

        let x = &abc.result["main"][0];
        assert_eq!(x.component, "New");
        assert_eq!(x.priority, Some(10));
        assert_eq!(abc.owners["main/x"], "B");

        let stepwise = merge_view_extensions(Layer::new("AB", &ab.result), &[Layer::new("C", &c)]);
        assert_eq!(stepwise.result, abc.result);
    }

    #[test]
    fn regions_keep_first_appearance_order() {
        let a = ViewExtensions::from([
            ("header".to_string(), vec![ViewExtension::new("h", "H")]),
            ("main".to_string(), vec![ViewExtension::new("m", "M")]),
        ]);
        let b = region("header", vec![ViewExtension::new("h2", "H2")]);

        let out = merge_view_extensions(Layer::new("A", &a), &[Layer::new("B", &b)]);
        let regions: Vec<_> = out.result.keys().cloned().collect();
        assert_eq!(regions, vec!["header", "main"]);
        assert_eq!(ids(&out, "header"), vec!["h", "h2"]);
    }
}
