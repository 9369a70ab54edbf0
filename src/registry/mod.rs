//! Artifact registry: which dependencies map to downloadable binaries.
//!
//! Known binaries form a closed set ([`KnownArtifact`]); everything else is
//! treated as a plain registry tarball. Descriptors are stateless and only
//! combine a version with a [`PlatformTarget`] into a URL and an asset name.

/// Default package registry host for tarball downloads
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Whether an artifact is a per-platform binary or a single registry tarball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Per-platform binary archive
    Binary,
    /// Single package-registry tarball
    Registry,
}

impl ArtifactKind {
    /// Content type used when uploading assets of this kind
    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactKind::Binary => "application/zip",
            ArtifactKind::Registry => "application/gzip",
        }
    }
}

/// One os/arch combination an artifact is published for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    /// Human label ("Linux", "macOS", ...)
    pub os: &'static str,
    /// Vendor platform identifier used in URLs
    pub platform: &'static str,
    /// Vendor architecture identifier used in URLs
    pub arch: &'static str,
}

impl PlatformTarget {
    const fn new(os: &'static str, platform: &'static str, arch: &'static str) -> Self {
        Self { os, platform, arch }
    }
}

/// The single synthetic target registry tarballs are processed under
pub const REGISTRY_TARGET: PlatformTarget = PlatformTarget::new("All Platforms", "registry", "all");

const REGISTRY_TARGETS: &[PlatformTarget] = &[REGISTRY_TARGET];

const CYPRESS_TARGETS: &[PlatformTarget] = &[
    PlatformTarget::new("Linux", "linux", "x64"),
    PlatformTarget::new("macOS", "darwin", "x64"),
    PlatformTarget::new("Windows", "win32", "x64"),
];

const ELECTRON_TARGETS: &[PlatformTarget] = &[
    PlatformTarget::new("Linux", "linux", "x64"),
    PlatformTarget::new("macOS", "darwin", "x64"),
    PlatformTarget::new("macOS", "darwin", "arm64"),
    PlatformTarget::new("Windows", "win32", "x64"),
];

const CHROMEDRIVER_TARGETS: &[PlatformTarget] = &[
    PlatformTarget::new("Linux", "linux64", "x64"),
    PlatformTarget::new("macOS", "mac-x64", "x64"),
    PlatformTarget::new("macOS", "mac-arm64", "arm64"),
    PlatformTarget::new("Windows", "win64", "x64"),
];

/// Binaries with vendor-specific download locations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownArtifact {
    /// Cypress test runner desktop app
    Cypress,
    /// Electron runtime
    Electron,
    /// ChromeDriver from Chrome for Testing
    Chromedriver,
}

impl KnownArtifact {
    /// Every known artifact, in lookup order
    pub const ALL: [KnownArtifact; 3] = [
        KnownArtifact::Cypress,
        KnownArtifact::Electron,
        KnownArtifact::Chromedriver,
    ];

    /// Look up a dependency name. Matching is exact.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.package_name() == name)
    }

    /// Dependency name as declared in the manifest
    pub fn package_name(self) -> &'static str {
        match self {
            KnownArtifact::Cypress => "cypress",
            KnownArtifact::Electron => "electron",
            KnownArtifact::Chromedriver => "chromedriver",
        }
    }

    /// Name used in release titles
    pub fn display_name(self) -> &'static str {
        match self {
            KnownArtifact::Cypress => "Cypress",
            KnownArtifact::Electron => "Electron",
            KnownArtifact::Chromedriver => "ChromeDriver",
        }
    }

    /// Targets mirrored for this artifact
    pub fn platforms(self) -> &'static [PlatformTarget] {
        match self {
            KnownArtifact::Cypress => CYPRESS_TARGETS,
            KnownArtifact::Electron => ELECTRON_TARGETS,
            KnownArtifact::Chromedriver => CHROMEDRIVER_TARGETS,
        }
    }

    fn url(self, version: &str, target: &PlatformTarget) -> String {
        let PlatformTarget { platform, arch, .. } = target;
        match self {
            KnownArtifact::Cypress => format!(
                "https://download.cypress.io/desktop/{version}?platform={platform}&arch={arch}"
            ),
            KnownArtifact::Electron => format!(
                "https://github.com/electron/electron/releases/download/v{version}/electron-v{version}-{platform}-{arch}.zip"
            ),
            KnownArtifact::Chromedriver => format!(
                "https://storage.googleapis.com/chrome-for-testing-public/{version}/{platform}/chromedriver-{platform}.zip"
            ),
        }
    }

    fn filename(self, version: &str, target: &PlatformTarget) -> String {
        let PlatformTarget { platform, arch, .. } = target;
        match self {
            // Electron's own asset naming, kept so mirrors are drop-in
            KnownArtifact::Electron => format!("electron-v{version}-{platform}-{arch}.zip"),
            _ => format!("{}-{version}-{platform}-{arch}.zip", self.package_name()),
        }
    }
}

/// Recipe for turning a version into downloadable assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactDescriptor {
    /// A vendor binary from the known table
    Known(KnownArtifact),
    /// A package-registry tarball
    Registry {
        /// Package name as declared (may be scoped)
        name: String,
        /// Registry host, without trailing slash
        registry_url: String,
    },
}

impl ArtifactDescriptor {
    /// Classify a dependency name, falling back to a registry tarball
    pub fn classify(name: &str, registry_url: &str) -> Self {
        match KnownArtifact::lookup(name) {
            Some(known) => ArtifactDescriptor::Known(known),
            None => ArtifactDescriptor::Registry {
                name: name.to_string(),
                registry_url: registry_url.trim_end_matches('/').to_string(),
            },
        }
    }

    /// Binary or registry
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactDescriptor::Known(_) => ArtifactKind::Binary,
            ArtifactDescriptor::Registry { .. } => ArtifactKind::Registry,
        }
    }

    /// Name used in release titles
    pub fn display_name(&self) -> &str {
        match self {
            ArtifactDescriptor::Known(known) => known.display_name(),
            ArtifactDescriptor::Registry { name, .. } => name,
        }
    }

    /// Targets to download, in processing order
    pub fn platforms(&self) -> &[PlatformTarget] {
        match self {
            ArtifactDescriptor::Known(known) => known.platforms(),
            ArtifactDescriptor::Registry { .. } => REGISTRY_TARGETS,
        }
    }

    /// Source URL for one target
    pub fn build_url(&self, version: &str, target: &PlatformTarget) -> String {
        match self {
            ArtifactDescriptor::Known(known) => known.url(version, target),
            ArtifactDescriptor::Registry { name, registry_url } => {
                // npm tarballs drop the scope from the file part: @s/p -> p-1.0.0.tgz
                let base = name.rsplit('/').next().unwrap_or(name);
                format!("{registry_url}/{name}/-/{base}-{version}.tgz")
            }
        }
    }

    /// Release asset filename for one target
    pub fn build_filename(&self, version: &str, target: &PlatformTarget) -> String {
        match self {
            ArtifactDescriptor::Known(known) => known.filename(version, target),
            ArtifactDescriptor::Registry { name, .. } => {
                let flat = name.trim_start_matches('@').replace('/', "-");
                format!("{flat}-{version}.tgz")
            }
        }
    }
}
