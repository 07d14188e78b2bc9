//! Scratch project fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Project-level configuration document with overlays for two platforms
pub const PROJECT_CONFIG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<widget xmlns="http://www.w3.org/ns/widgets" id="io.example.app" version="1.0.0">
    <name>Example</name>
    <description>Example application</description>
    <content src="index.html" />
    <access origin="*" />
    <preference name="Fullscreen" value="false" />
    <platform name="android">
        <preference name="AndroidLaunchMode" value="singleTop" />
    </platform>
    <platform name="ios">
        <preference name="BackupWebStorage" value="none" />
    </platform>
</widget>
"#;

/// A project on disk: `config.xml`, `www/index.html` and any added platforms
pub struct ScratchProject {
    pub dir: TempDir,
}

impl ScratchProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.xml"), PROJECT_CONFIG).unwrap();
        fs::create_dir_all(dir.path().join("www")).unwrap();
        fs::write(dir.path().join("www/index.html"), "<html></html>").unwrap();
        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn add_platform(&self, name: &str) -> &Self {
        fs::create_dir_all(self.path("platforms").join(name)).unwrap();
        self
    }

    pub fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }
}

/// Web asset directory of a platform under the default layout
pub fn platform_www(root: &Path, platform: &str) -> PathBuf {
    root.join("platforms").join(platform).join("www")
}
