use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to a component.
///
/// A [`ResultSet`](crate::ResultSet) keeps one handle per stored component;
/// handles returned to callers stay valid after the component is removed or
/// the result set is dropped.
pub type ComponentRef = Arc<RwLock<Component>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    #[default]
    Generic,
    #[serde(rename = "desktop-application")]
    DesktopApp,
    #[serde(rename = "console-application")]
    ConsoleApp,
    #[serde(rename = "web-application")]
    WebApp,
    Addon,
    Font,
    Codec,
    #[serde(rename = "inputmethod")]
    InputMethod,
    Firmware,
    Driver,
    Localization,
    Service,
    Repository,
    OperatingSystem,
    IconTheme,
    Runtime,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Generic => "generic",
            ComponentKind::DesktopApp => "desktop-application",
            ComponentKind::ConsoleApp => "console-application",
            ComponentKind::WebApp => "web-application",
            ComponentKind::Addon => "addon",
            ComponentKind::Font => "font",
            ComponentKind::Codec => "codec",
            ComponentKind::InputMethod => "inputmethod",
            ComponentKind::Firmware => "firmware",
            ComponentKind::Driver => "driver",
            ComponentKind::Localization => "localization",
            ComponentKind::Service => "service",
            ComponentKind::Repository => "repository",
            ComponentKind::OperatingSystem => "operating-system",
            ComponentKind::IconTheme => "icon-theme",
            ComponentKind::Runtime => "runtime",
        }
    }

    /// Kinds that describe whole systems or endpoints rather than something
    /// shipped inside a package.
    pub fn is_bundle_independent(&self) -> bool {
        matches!(self, ComponentKind::WebApp | ComponentKind::OperatingSystem)
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeKind {
    #[default]
    None,
    Replace,
    Append,
    RemoveComponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleKind {
    Package,
    Limba,
    Flatpak,
    AppImage,
    Snap,
    Tarball,
    Cabinet,
    Linglong,
}

impl BundleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleKind::Package => "package",
            BundleKind::Limba => "limba",
            BundleKind::Flatpak => "flatpak",
            BundleKind::AppImage => "appimage",
            BundleKind::Snap => "snap",
            BundleKind::Tarball => "tarball",
            BundleKind::Cabinet => "cabinet",
            BundleKind::Linglong => "linglong",
        }
    }
}

impl std::fmt::Display for BundleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BundleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "package" => Ok(BundleKind::Package),
            "limba" => Ok(BundleKind::Limba),
            "flatpak" => Ok(BundleKind::Flatpak),
            "appimage" => Ok(BundleKind::AppImage),
            "snap" => Ok(BundleKind::Snap),
            "tarball" => Ok(BundleKind::Tarball),
            "cabinet" => Ok(BundleKind::Cabinet),
            "linglong" => Ok(BundleKind::Linglong),
            _ => Err(format!("Unknown bundle kind: {}", s)),
        }
    }
}

/// Bundle association of a whole unit.
///
/// `Unknown` and `Unsupported` both mean no bundle is recorded on the
/// components of the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "kind")]
pub enum UnitBundle {
    #[default]
    Unknown,
    Known(BundleKind),
    Unsupported,
}

impl UnitBundle {
    pub fn known(&self) -> Option<BundleKind> {
        match self {
            UnitBundle::Known(kind) => Some(*kind),
            UnitBundle::Unknown | UnitBundle::Unsupported => None,
        }
    }
}

impl From<BundleKind> for UnitBundle {
    fn from(kind: BundleKind) -> Self {
        UnitBundle::Known(kind)
    }
}

impl std::fmt::Display for UnitBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitBundle::Unknown => write!(f, "unknown"),
            UnitBundle::Known(kind) => write!(f, "{}", kind),
            UnitBundle::Unsupported => write!(f, "unsupported"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub kind: BundleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Bundle {
    pub fn new(kind: BundleKind, id: Option<&str>) -> Self {
        Self {
            kind,
            id: id.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Component {
    id: String,
    #[serde(default)]
    kind: ComponentKind,
    #[serde(default)]
    merge_kind: MergeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default, rename = "gcid", skip_serializing_if = "Option::is_none")]
    data_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pkgnames: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bundles: Vec<Bundle>,
}

impl Component {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_merge_kind(mut self, merge_kind: MergeKind) -> Self {
        self.merge_kind = merge_kind;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Wraps the component into a shared handle.
    pub fn into_ref(self) -> ComponentRef {
        Arc::new(RwLock::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ComponentKind) {
        self.kind = kind;
    }

    pub fn merge_kind(&self) -> MergeKind {
        self.merge_kind
    }

    pub fn set_merge_kind(&mut self, merge_kind: MergeKind) {
        self.merge_kind = merge_kind;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The global component ID, if one has been assigned.
    pub fn data_id(&self) -> Option<&str> {
        self.data_id.as_deref()
    }

    pub fn set_data_id(&mut self, gcid: Option<String>) {
        self.data_id = gcid;
    }

    pub fn pkgnames(&self) -> &[String] {
        &self.pkgnames
    }

    pub fn set_pkgnames(&mut self, pkgnames: Vec<String>) {
        self.pkgnames = pkgnames;
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn add_bundle(&mut self, bundle: Bundle) {
        self.bundles.push(bundle);
    }
}
