//! Build metadata embedded by the build script.

use std::fmt;

/// Facts about this binary, stamped at compile time.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    pub git_dirty: bool,
    pub build_timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc_version: &'static str,
}

/// Snapshot the build facts the build script exported.
pub fn build_info() -> BuildInfo {
    BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("PERSONA_GIT_HASH"),
        git_branch: env!("PERSONA_GIT_BRANCH"),
        git_dirty: env!("PERSONA_GIT_DIRTY") == "true",
        build_timestamp: env!("PERSONA_BUILD_TIMESTAMP"),
        target: env!("PERSONA_TARGET"),
        profile: env!("PERSONA_PROFILE"),
        rustc_version: env!("PERSONA_RUSTC_VERSION"),
    }
}

impl BuildInfo {
    /// Version plus commit, e.g. `0.1.0-a1b2c3d4` (`-dirty` when the tree
    /// had uncommitted changes at build time).
    pub fn full_version(&self) -> String {
        let dirty = if self.git_dirty { "-dirty" } else { "" };
        format!("{}-{}{}", self.version, self.git_hash, dirty)
    }

    pub fn short_version(&self) -> String {
        format!("{} ({})", self.version, self.git_hash)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "Build Information:")?;
        writeln!(f, "  Version:    {}", self.version)?;
        let dirty = if self.git_dirty { " (dirty)" } else { "" };
        writeln!(f, "  Git Hash:   {}{}", self.git_hash, dirty)?;
        writeln!(f, "  Git Branch: {}", self.git_branch)?;
        writeln!(f, "  Built:      {}", self.build_timestamp)?;
        writeln!(f, "  Profile:    {}", self.profile)?;
        writeln!(f, "  Target:     {}", self.target)?;
        writeln!(f, "  Rustc:      {}", self.rustc_version)?;
        Ok(())
    }
}

/// Print version information to stdout.
pub fn print_version() {
    print!("{}", build_info());
}
