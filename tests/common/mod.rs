//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_unity_project();
//! fixture.command().arg("verify").arg(fixture.project()).assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::recipes;
    pub use super::TestFixture;
}

/// A Unity export: app target linking UnityFramework, a Data folder in the
/// app's resources and a plugin header in the framework.
pub const UNITY_DESCRIPTOR: &str = include_str!("../testdata/Unity-iPhone.pbxproj");

/// Location of the Unity project inside a fixture.
pub const UNITY_PROJECT: &str = "UnityBuild/Unity-iPhone.xcodeproj";

/// Recipe snippets for testing.
#[allow(dead_code)]
pub mod recipes {
    /// The complete Unity post-export patch.
    pub const UNITY: &str = r#"
- embed_framework:
    project: UnityBuild/Unity-iPhone.xcodeproj
    framework: UnityFramework.framework
- move_resource:
    project: UnityBuild/Unity-iPhone.xcodeproj
    path: Data
    from_target: Unity-iPhone
    to_target: UnityFramework
- public_header:
    project: UnityBuild/Unity-iPhone.xcodeproj
    marker: Libraries/Plugins/iOS
"#;

    /// A recipe whose last step cannot succeed.
    pub const FAILING: &str = r#"
- embed_framework:
    project: UnityBuild/Unity-iPhone.xcodeproj
    framework: UnityFramework.framework
- public_header:
    project: UnityBuild/Unity-iPhone.xcodeproj
    marker: Libraries/Missing
"#;
}

/// A temporary directory populated with projects and recipes.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add the Unity export under `UnityBuild/`.
    pub fn with_unity_project(self) -> Self {
        self.with_file(
            &format!("{}/project.pbxproj", UNITY_PROJECT),
            UNITY_DESCRIPTOR,
        )
    }

    /// Add a `.pbxpatch.yaml` recipe with the given content.
    pub fn with_recipe(self, content: &str) -> Self {
        self.with_file(".pbxpatch.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The Unity `.xcodeproj` bundle.
    pub fn project(&self) -> PathBuf {
        self.path().join(UNITY_PROJECT)
    }

    /// The Unity descriptor file.
    pub fn descriptor(&self) -> PathBuf {
        self.project().join("project.pbxproj")
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// A command running in this fixture's directory, without colors.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pbxpatch");
        cmd.current_dir(self.path()).arg("--color").arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
