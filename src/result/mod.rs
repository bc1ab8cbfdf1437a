//! Compose results for a single unit.
//!
//! A [`ResultSet`] collects everything found while composing one unit (a
//! package, bundle or repository artifact): the components it ships, the
//! hints raised while processing it, and the bundle it belongs to.
//!
//! Each stored component carries a global component ID (GCID). The GCID
//! checksum is a hash chain over every data fragment registered for the
//! component, so feeding the same fragments in the same order always yields
//! the same GCID.
//!
//! # Example
//!
//! ```
//! use compose_result::model::{BundleKind, Component, ComponentKind};
//! use compose_result::ResultSet;
//!
//! let mut result = ResultSet::new();
//! result.set_bundle_kind(BundleKind::Package);
//! result.set_bundle_id(Some("foo"));
//!
//! let cpt = Component::new("org.example.Foo", ComponentKind::DesktopApp).into_ref();
//! result.add_component(cpt.clone(), "<component/>")?;
//!
//! assert_eq!(result.components_count(), 1);
//! assert_eq!(cpt.read().pkgnames(), ["foo".to_string()]);
//! assert!(cpt.read().data_id().unwrap().starts_with("org/example/Foo/"));
//! # Ok::<(), compose_result::ComposeError>(())
//! ```

mod gcid;

pub use gcid::{build_component_global_id, is_top_level_domain, ChecksumKind};

use crate::error::{ComposeError, Result};
use crate::model::{Bundle, BundleKind, Component, ComponentRef, Hint, MergeKind, UnitBundle};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};

/// Results of composing a single unit.
#[derive(Debug, Default)]
pub struct ResultSet {
    bundle_kind: UnitBundle,
    bundle_id: Option<String>,
    checksum: ChecksumKind,

    components: HashMap<String, ComponentRef>,
    hash_state: HashMap<String, String>,
    hints: HashMap<String, Vec<Hint>>,
}

/// Serializable snapshot of a [`ResultSet`].
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub bundle_kind: UnitBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    pub components: Vec<Component>,
    pub hints: BTreeMap<String, Vec<Hint>>,
}

#[derive(Serialize)]
struct HintsExport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    bundle_id: Option<&'a str>,
    hints: BTreeMap<&'a str, &'a [Hint]>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty result set hashing GCID data with `checksum`.
    pub fn with_checksum(checksum: ChecksumKind) -> Self {
        Self {
            checksum,
            ..Self::default()
        }
    }

    pub fn checksum(&self) -> ChecksumKind {
        self.checksum
    }

    /// Returns `true` if the unit produced neither components nor hints.
    pub fn is_unit_ignored(&self) -> bool {
        self.components.is_empty() && self.hints.is_empty()
    }

    pub fn components_count(&self) -> usize {
        self.components.len()
    }

    /// Number of component IDs that have hints attached.
    pub fn hints_count(&self) -> usize {
        self.hints.len()
    }

    pub fn bundle_kind(&self) -> UnitBundle {
        self.bundle_kind
    }

    pub fn set_bundle_kind(&mut self, kind: impl Into<UnitBundle>) {
        self.bundle_kind = kind.into();
    }

    /// Name of the package, Flatpak or other entity these results are for.
    pub fn bundle_id(&self) -> Option<&str> {
        self.bundle_id.as_deref()
    }

    pub fn set_bundle_id(&mut self, id: Option<&str>) {
        self.bundle_id = id.map(str::to_string);
    }

    pub fn get_component(&self, cid: &str) -> Option<ComponentRef> {
        self.components.get(cid).cloned()
    }

    /// Returns handles to every stored component.
    pub fn fetch_components(&self) -> Vec<ComponentRef> {
        self.components.values().cloned().collect()
    }

    /// IDs of all stored components, sorted.
    pub fn component_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.components.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn get_hints(&self, cid: &str) -> Option<&[Hint]> {
        self.hints.get(cid).map(Vec::as_slice)
    }

    /// Appends a hint for the component with ID `cid`.
    ///
    /// The component does not need to be part of this result set.
    pub fn add_hint(&mut self, cid: &str, hint: Hint) {
        trace!(cid, tag = %hint.tag, severity = %hint.severity, "Adding hint");
        self.hints.entry(cid.to_string()).or_default().push(hint);
    }

    pub fn hints(&self) -> impl Iterator<Item = (&str, &[Hint])> {
        self.hints
            .iter()
            .map(|(cid, hints)| (cid.as_str(), hints.as_slice()))
    }

    /// Returns a copy of all hints, keyed by component ID.
    pub fn fetch_hints(&self) -> BTreeMap<String, Vec<Hint>> {
        self.hints
            .iter()
            .map(|(cid, hints)| (cid.clone(), hints.clone()))
            .collect()
    }

    /// Updates the global component ID of `cpt` with another chunk of data.
    ///
    /// The checksum part of the GCID chains over every chunk passed for the
    /// component so far. A component with an empty ID gets its GCID reset
    /// without being looked up.
    ///
    /// Returns `false` if the component is not part of this result set.
    ///
    /// The chain belongs to the stored instance. A different instance that
    /// shares the stored component's ID gets a checksum of `data` alone and
    /// leaves the stored chain untouched.
    pub fn update_component_gcid(&mut self, cpt: &ComponentRef, data: &str) -> bool {
        let cid = cpt.read().id().to_string();

        if cid.is_empty() {
            cpt.write().set_data_id(build_component_global_id(&cid, None));
            return true;
        }
        let is_stored = match self.components.get(&cid) {
            Some(stored) => Arc::ptr_eq(stored, cpt),
            None => return false,
        };

        let hash = match self.hash_state.get(&cid).filter(|_| is_stored) {
            None => self.checksum.compute(data),
            Some(old_hash) => self.checksum.compute(&format!("{}{}", old_hash, data)),
        };

        let gcid = build_component_global_id(&cid, Some(&hash));
        trace!(cid, gcid = gcid.as_deref().unwrap_or_default(), is_stored, "Updated GCID");
        if is_stored {
            self.hash_state.insert(cid, hash);
        }
        cpt.write().set_data_id(gcid);

        true
    }

    /// Adds a component to the result set.
    ///
    /// `data` is the source data used to seed the component's GCID checksum.
    /// A component already stored under the same ID is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidArgument`] if the component ID is empty.
    pub fn add_component(&mut self, cpt: ComponentRef, data: &str) -> Result<()> {
        let cid = cpt.read().id().to_string();
        if cid.is_empty() {
            return Err(ComposeError::InvalidArgument(
                "Can not add component with empty ID to results set.".to_string(),
            ));
        }

        self.attach_bundle(&mut cpt.write());

        if let Some(previous) = self.components.insert(cid.clone(), Arc::clone(&cpt)) {
            if !Arc::ptr_eq(&previous, &cpt) {
                debug!(cid, "Replacing component with a new instance");
                self.hash_state.remove(&cid);
            }
        }

        let updated = self.update_component_gcid(&cpt, data);
        assert!(updated, "component '{}' missing right after insertion", cid);

        Ok(())
    }

    /// Records the bundle this result set belongs to on `cpt`.
    ///
    /// Web applications, operating systems and component-removal merges are
    /// never tied to a bundle.
    fn attach_bundle(&self, cpt: &mut Component) {
        if cpt.kind().is_bundle_independent() || cpt.merge_kind() == MergeKind::RemoveComponent {
            trace!(cid = cpt.id(), "Component is bundle-independent");
            return;
        }

        match self.bundle_kind {
            UnitBundle::Known(BundleKind::Package) => {
                cpt.set_pkgnames(self.bundle_id.iter().cloned().collect());
            }
            UnitBundle::Known(kind) => {
                cpt.add_bundle(Bundle::new(kind, self.bundle_id.as_deref()));
            }
            UnitBundle::Unknown | UnitBundle::Unsupported => {}
        }
    }

    /// Removes a component from the result set.
    ///
    /// Hints raised for the component are kept. Returns `true` if the
    /// component was found and removed.
    pub fn remove_component(&mut self, cpt: &ComponentRef) -> bool {
        let cid = cpt.read().id().to_string();

        let removed = self.components.remove(&cid).is_some();
        if removed {
            debug!(cid, "Removed component");
            cpt.write().set_data_id(None);
        }
        self.hash_state.remove(&cid);

        removed
    }

    pub fn remove_component_by_id(&mut self, cid: &str) -> bool {
        match self.components.get(cid).cloned() {
            Some(cpt) => self.remove_component(&cpt),
            None => false,
        }
    }

    pub fn gcid_for_component_id(&self, cid: &str) -> Option<String> {
        let cpt = self.components.get(cid)?;
        let gcid = cpt.read().data_id().map(str::to_string);
        gcid
    }

    /// GCIDs of all stored components, sorted.
    pub fn component_gcids(&self) -> Vec<String> {
        let mut gcids: Vec<String> = self
            .components
            .values()
            .filter_map(|cpt| cpt.read().data_id().map(str::to_string))
            .collect();
        gcids.sort();
        gcids
    }

    /// Exports all hints of this unit as pretty-printed JSON.
    pub fn hints_to_json(&self) -> serde_json::Result<String> {
        let export = HintsExport {
            bundle_id: self.bundle_id(),
            hints: self.hints().collect(),
        };
        serde_json::to_string_pretty(&export)
    }

    /// Takes a snapshot of the result set, with components sorted by ID.
    pub fn report(&self) -> UnitReport {
        let components = self
            .component_ids()
            .iter()
            .filter_map(|cid| self.components.get(cid))
            .map(|cpt| cpt.read().clone())
            .collect();

        UnitReport {
            bundle_kind: self.bundle_kind,
            bundle_id: self.bundle_id.clone(),
            components,
            hints: self.fetch_hints(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentKind, HintSeverity};

    fn component(cid: &str, kind: ComponentKind) -> ComponentRef {
        Component::new(cid, kind).into_ref()
    }

    fn checksum_of(cpt: &ComponentRef) -> String {
        let gcid = cpt.read().data_id().map(str::to_string).unwrap();
        gcid.rsplit('/').next().unwrap().to_string()
    }

    fn sha256(data: &str) -> String {
        ChecksumKind::Sha256.compute(data)
    }

    #[test]
    fn test_new_result_is_ignored() {
        let result = ResultSet::new();
        assert!(result.is_unit_ignored());
        assert_eq!(result.components_count(), 0);
        assert_eq!(result.hints_count(), 0);
        assert_eq!(result.bundle_kind(), UnitBundle::Unknown);
        assert_eq!(result.bundle_id(), None);
    }

    #[test]
    fn test_add_and_get_component() {
        let mut result = ResultSet::new();
        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(cpt.clone(), "data").unwrap();

        let found = result.get_component("org.example.App").unwrap();
        assert!(Arc::ptr_eq(&found, &cpt));
        assert!(result.get_component("org.example.Other").is_none());
        assert!(!result.is_unit_ignored());
    }

    #[test]
    fn test_readding_same_id_keeps_count() {
        let mut result = ResultSet::new();
        result
            .add_component(component("org.example.App", ComponentKind::DesktopApp), "a")
            .unwrap();
        let replacement = component("org.example.App", ComponentKind::ConsoleApp);
        result.add_component(replacement.clone(), "a").unwrap();

        assert_eq!(result.components_count(), 1);
        let stored = result.get_component("org.example.App").unwrap();
        assert!(Arc::ptr_eq(&stored, &replacement));
    }

    #[test]
    fn test_add_empty_id_fails() {
        let mut result = ResultSet::new();
        let err = result
            .add_component(component("", ComponentKind::DesktopApp), "data")
            .unwrap_err();

        assert!(matches!(err, ComposeError::InvalidArgument(_)));
        assert_eq!(result.components_count(), 0);
        assert!(result.is_unit_ignored());
    }

    #[test]
    fn test_gcid_seeded_from_data() {
        let mut result = ResultSet::new();
        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(cpt.clone(), "a").unwrap();

        assert_eq!(
            cpt.read().data_id(),
            Some(format!("org/example/App/{}", sha256("a")).as_str())
        );
    }

    #[test]
    fn test_gcid_chaining_differs_from_concatenation() {
        let mut result = ResultSet::new();
        let chained = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(chained.clone(), "a").unwrap();
        assert!(result.update_component_gcid(&chained, "b"));

        let expected = sha256(&format!("{}{}", sha256("a"), "b"));
        assert_eq!(checksum_of(&chained), expected);
        assert_ne!(checksum_of(&chained), sha256("ab"));
    }

    #[test]
    fn test_gcid_chain_is_per_component() {
        let mut result = ResultSet::new();
        let first = component("org.example.First", ComponentKind::DesktopApp);
        let second = component("org.example.Second", ComponentKind::DesktopApp);
        result.add_component(first.clone(), "a").unwrap();
        result.add_component(second.clone(), "a").unwrap();
        result.update_component_gcid(&first, "b");

        assert_eq!(checksum_of(&second), sha256("a"));
        assert_ne!(checksum_of(&first), checksum_of(&second));
    }

    #[test]
    fn test_readding_same_instance_extends_chain() {
        let mut result = ResultSet::new();
        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(cpt.clone(), "a").unwrap();
        result.add_component(cpt.clone(), "b").unwrap();

        assert_eq!(checksum_of(&cpt), sha256(&format!("{}b", sha256("a"))));
    }

    #[test]
    fn test_replacing_instance_restarts_chain() {
        let mut result = ResultSet::new();
        result
            .add_component(component("org.example.App", ComponentKind::DesktopApp), "a")
            .unwrap();
        let replacement = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(replacement.clone(), "b").unwrap();

        assert_eq!(checksum_of(&replacement), sha256("b"));
    }

    #[test]
    fn test_replaced_instance_does_not_advance_stored_chain() {
        let mut result = ResultSet::new();
        let old = component("org.example.App", ComponentKind::DesktopApp);
        let new = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(old.clone(), "a").unwrap();
        result.add_component(new.clone(), "b").unwrap();

        assert!(result.update_component_gcid(&old, "c"));
        assert_eq!(checksum_of(&old), sha256("c"));
        assert_eq!(checksum_of(&new), sha256("b"));

        assert!(result.update_component_gcid(&new, "d"));
        assert_eq!(checksum_of(&new), sha256(&format!("{}d", sha256("b"))));
    }

    #[test]
    fn test_update_unknown_component_fails() {
        let mut result = ResultSet::new();
        let cpt = component("org.example.App", ComponentKind::DesktopApp);

        assert!(!result.update_component_gcid(&cpt, "a"));
        assert!(cpt.read().data_id().is_none());
    }

    #[test]
    fn test_update_empty_id_needs_no_registration() {
        let mut result = ResultSet::new();
        let cpt = component("", ComponentKind::DesktopApp);
        cpt.write().set_data_id(Some("stale".to_string()));

        assert!(result.update_component_gcid(&cpt, "a"));
        assert!(cpt.read().data_id().is_none());
        assert_eq!(result.components_count(), 0);
    }

    #[test]
    fn test_sha512_checksum() {
        let mut result = ResultSet::with_checksum(ChecksumKind::Sha512);
        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(cpt.clone(), "a").unwrap();

        assert_eq!(checksum_of(&cpt), ChecksumKind::Sha512.compute("a"));
    }

    #[test]
    fn test_package_bundle_sets_pkgnames() {
        let mut result = ResultSet::new();
        result.set_bundle_kind(BundleKind::Package);
        result.set_bundle_id(Some("foo"));

        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        cpt.write().set_pkgnames(vec!["old".to_string(), "older".to_string()]);
        result.add_component(cpt.clone(), "a").unwrap();

        assert_eq!(cpt.read().pkgnames(), ["foo".to_string()]);
        assert!(cpt.read().bundles().is_empty());
    }

    #[test]
    fn test_package_bundle_without_id_clears_pkgnames() {
        let mut result = ResultSet::new();
        result.set_bundle_kind(BundleKind::Package);

        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        cpt.write().set_pkgnames(vec!["old".to_string()]);
        result.add_component(cpt.clone(), "a").unwrap();

        assert!(cpt.read().pkgnames().is_empty());
    }

    #[test]
    fn test_bundle_independent_components_untouched() {
        let mut result = ResultSet::new();
        result.set_bundle_kind(BundleKind::Package);
        result.set_bundle_id(Some("foo"));

        let webapp = component("org.example.Web", ComponentKind::WebApp);
        let os = component("org.example.OS", ComponentKind::OperatingSystem);
        let removal = Component::new("org.example.Gone", ComponentKind::DesktopApp)
            .with_merge_kind(MergeKind::RemoveComponent)
            .into_ref();
        for cpt in [&webapp, &os, &removal] {
            result.add_component(cpt.clone(), "a").unwrap();
            assert!(cpt.read().pkgnames().is_empty());
            assert!(cpt.read().bundles().is_empty());
        }
        assert_eq!(result.components_count(), 3);
    }

    #[test]
    fn test_other_bundle_kinds_append_bundle() {
        let mut result = ResultSet::new();
        result.set_bundle_kind(BundleKind::Flatpak);
        result.set_bundle_id(Some("app/org.example.App/x86_64/stable"));

        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        cpt.write().add_bundle(Bundle::new(BundleKind::Snap, Some("example")));
        result.add_component(cpt.clone(), "a").unwrap();

        let cpt = cpt.read();
        assert_eq!(cpt.bundles().len(), 2);
        assert_eq!(
            cpt.bundles()[1],
            Bundle::new(BundleKind::Flatpak, Some("app/org.example.App/x86_64/stable"))
        );
        assert!(cpt.pkgnames().is_empty());
    }

    #[test]
    fn test_unknown_and_unsupported_bundles_add_nothing() {
        for kind in [UnitBundle::Unknown, UnitBundle::Unsupported] {
            let mut result = ResultSet::new();
            result.set_bundle_kind(kind);
            result.set_bundle_id(Some("foo"));

            let cpt = component("org.example.App", ComponentKind::DesktopApp);
            result.add_component(cpt.clone(), "a").unwrap();
            assert!(cpt.read().pkgnames().is_empty());
            assert!(cpt.read().bundles().is_empty());
        }
    }

    #[test]
    fn test_remove_component() {
        let mut result = ResultSet::new();
        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(cpt.clone(), "a").unwrap();
        result.add_hint("org.example.App", Hint::new("icon-not-found", HintSeverity::Warning));

        assert!(result.remove_component(&cpt));
        assert!(result.get_component("org.example.App").is_none());
        assert!(cpt.read().data_id().is_none());
        assert!(!result.update_component_gcid(&cpt, "b"));
        assert!(!result.remove_component(&cpt));

        // hints survive removal
        assert_eq!(result.get_hints("org.example.App").map(<[Hint]>::len), Some(1));
        assert!(!result.is_unit_ignored());
    }

    #[test]
    fn test_readd_after_remove_restarts_chain() {
        let mut result = ResultSet::new();
        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(cpt.clone(), "a").unwrap();
        result.remove_component(&cpt);
        result.add_component(cpt.clone(), "b").unwrap();

        assert_eq!(checksum_of(&cpt), sha256("b"));
    }

    #[test]
    fn test_remove_component_by_id() {
        let mut result = ResultSet::new();
        let cpt = component("org.example.App", ComponentKind::DesktopApp);
        result.add_component(cpt.clone(), "a").unwrap();

        assert!(!result.remove_component_by_id("org.example.Other"));
        assert!(result.remove_component_by_id("org.example.App"));
        assert_eq!(result.components_count(), 0);
        assert!(cpt.read().data_id().is_none());
    }

    #[test]
    fn test_hints_keep_order_and_allow_unknown_ids() {
        let mut result = ResultSet::new();
        result.add_hint("org.example.Missing", Hint::new("first", HintSeverity::Error));
        result.add_hint("org.example.Missing", Hint::new("second", HintSeverity::Info));

        let tags: Vec<&str> = result
            .get_hints("org.example.Missing")
            .unwrap()
            .iter()
            .map(|h| h.tag.as_str())
            .collect();
        assert_eq!(tags, ["first", "second"]);
        assert_eq!(result.hints_count(), 1);
        assert_eq!(result.components_count(), 0);
        assert!(!result.is_unit_ignored());
        assert!(result.get_hints("org.example.Other").is_none());
    }

    #[test]
    fn test_fetch_components_outlive_result() {
        let mut result = ResultSet::new();
        result
            .add_component(component("org.example.A", ComponentKind::DesktopApp), "a")
            .unwrap();
        result
            .add_component(component("org.example.B", ComponentKind::Addon), "b")
            .unwrap();

        let fetched = result.fetch_components();
        drop(result);

        let mut ids: Vec<String> = fetched.iter().map(|c| c.read().id().to_string()).collect();
        ids.sort();
        assert_eq!(ids, ["org.example.A", "org.example.B"]);
    }

    #[test]
    fn test_component_ids_and_gcids() {
        let mut result = ResultSet::new();
        result
            .add_component(component("org.example.B", ComponentKind::DesktopApp), "b")
            .unwrap();
        result
            .add_component(component("org.example.A", ComponentKind::DesktopApp), "a")
            .unwrap();

        assert_eq!(result.component_ids(), ["org.example.A", "org.example.B"]);
        assert_eq!(
            result.gcid_for_component_id("org.example.A"),
            Some(format!("org/example/A/{}", sha256("a")))
        );
        assert_eq!(result.gcid_for_component_id("org.example.C"), None);
        assert_eq!(
            result.component_gcids(),
            [
                format!("org/example/A/{}", sha256("a")),
                format!("org/example/B/{}", sha256("b")),
            ]
        );
    }

    #[test]
    fn test_hints_to_json() {
        let mut result = ResultSet::new();
        result.set_bundle_id(Some("foo"));
        result.add_hint(
            "org.example.App",
            Hint::new("icon-not-found", HintSeverity::Warning).with_var("icon_fname", "app.png"),
        );

        let json: serde_json::Value = serde_json::from_str(&result.hints_to_json().unwrap()).unwrap();
        assert_eq!(json["bundle_id"], "foo");
        assert_eq!(json["hints"]["org.example.App"][0]["tag"], "icon-not-found");
        assert_eq!(json["hints"]["org.example.App"][0]["severity"], "warning");
        assert_eq!(
            json["hints"]["org.example.App"][0]["variables"]["icon_fname"],
            "app.png"
        );
    }

    #[test]
    fn test_report_is_sorted_snapshot() {
        let mut result = ResultSet::new();
        result.set_bundle_kind(BundleKind::Package);
        result.set_bundle_id(Some("foo"));
        result
            .add_component(component("org.example.B", ComponentKind::DesktopApp), "b")
            .unwrap();
        result
            .add_component(component("org.example.A", ComponentKind::DesktopApp), "a")
            .unwrap();

        let report = result.report();
        assert_eq!(report.bundle_kind, UnitBundle::Known(BundleKind::Package));
        assert_eq!(report.bundle_id.as_deref(), Some("foo"));
        assert_eq!(report.components[0].id(), "org.example.A");
        assert_eq!(report.components[1].id(), "org.example.B");
        assert!(report.hints.is_empty());
    }
}
