//! Release scaffolding written by `shipwright init`.
//!
//! Bodies are static text; `{{app_name}}`, `{{package_name}}` and
//! `{{bundle_id}}` are substituted at render time.

use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub app_name: String,
    pub package_name: String,
    pub bundle_id: String,
}

impl TemplateVars {
    /// Fill blanks with identifiers derived from the app name
    /// (`com.example.<name>`).
    pub fn new(app_name: &str, package_name: Option<&str>, bundle_id: Option<&str>) -> Self {
        let ident: String = app_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        let fallback = format!("com.example.{}", ident.trim_matches('_'));
        Self {
            app_name: app_name.to_string(),
            package_name: package_name.map_or_else(|| fallback.clone(), str::to_string),
            bundle_id: bundle_id.map_or(fallback, str::to_string),
        }
    }
}

/// One file `init` manages.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub path: &'static str,
    body: &'static str,
    pub executable: bool,
}

impl Template {
    pub fn render(&self, vars: &TemplateVars) -> String {
        self.body
            .replace("{{app_name}}", &vars.app_name)
            .replace("{{package_name}}", &vars.package_name)
            .replace("{{bundle_id}}", &vars.bundle_id)
    }
}

pub const TEMPLATES: &[Template] = &[
    Template {
        path: paths::APPFILE,
        body: APPFILE,
        executable: false,
    },
    Template {
        path: paths::FASTFILE,
        body: FASTFILE,
        executable: false,
    },
    Template {
        path: paths::PLUGINFILE,
        body: PLUGINFILE,
        executable: false,
    },
    Template {
        path: paths::WORKFLOW_FILE,
        body: RELEASE_WORKFLOW,
        executable: false,
    },
    Template {
        path: paths::CI_ENV_SCRIPT,
        body: CI_ENV_SCRIPT,
        executable: true,
    },
];

const APPFILE: &str = r#"# {{app_name}}: app identifiers for fastlane
package_name(ENV.fetch("ANDROID_PACKAGE_NAME", "{{package_name}}"))
app_identifier(ENV.fetch("IOS_BUNDLE_ID", "{{bundle_id}}"))
"#;

const FASTFILE: &str = r#"# Release lanes for {{app_name}}.
# Firebase ids come from fastlane/.env, written by `shipwright firebase-sync`.

def tester_groups
  ENV.fetch("FIREBASE_TESTER_GROUPS", "testers")
end

platform :android do
  desc "Build an APK and upload it to Firebase App Distribution"
  lane :distribute do
    sh("flutter", "build", "apk", "--release")
    firebase_app_distribution(
      app: ENV.fetch("FIREBASE_ANDROID_APP_ID"),
      android_artifact_type: "APK",
      android_artifact_path: "../build/app/outputs/flutter-apk/app-release.apk",
      groups: tester_groups
    )
  end
end

platform :ios do
  desc "Build an IPA and upload it to Firebase App Distribution"
  lane :distribute do
    sh("flutter", "build", "ipa", "--release", "--export-method", "ad-hoc")
    firebase_app_distribution(
      app: ENV.fetch("FIREBASE_IOS_APP_ID"),
      ipa_path: Dir["../build/ios/ipa/*.ipa"].first,
      groups: tester_groups
    )
  end
end
"#;

const PLUGINFILE: &str = r#"# Autogenerated by shipwright init
gem "fastlane-plugin-firebase_app_distribution"
"#;

const RELEASE_WORKFLOW: &str = r#"name: Release {{app_name}}

on:
  workflow_dispatch:
  push:
    tags:
      - "v*"

jobs:
  android:
    runs-on: ubuntu-latest
    env:
      FIREBASE_TOKEN: ${{ secrets.FIREBASE_TOKEN }}
      FIREBASE_PROJECT_ID: ${{ vars.FIREBASE_PROJECT_ID }}
    steps:
      - uses: actions/checkout@v4
      - uses: subosito/flutter-action@v2
        with:
          channel: stable
      - uses: ruby/setup-ruby@v1
        with:
          ruby-version: "3.3"
          bundler-cache: true
      - run: npm install -g firebase-tools
      - run: ./scripts/ci_env.sh
      - run: bundle exec fastlane android distribute

  ios:
    runs-on: macos-latest
    env:
      FIREBASE_TOKEN: ${{ secrets.FIREBASE_TOKEN }}
      FIREBASE_PROJECT_ID: ${{ vars.FIREBASE_PROJECT_ID }}
    steps:
      - uses: actions/checkout@v4
      - uses: subosito/flutter-action@v2
        with:
          channel: stable
      - uses: ruby/setup-ruby@v1
        with:
          ruby-version: "3.3"
          bundler-cache: true
      - run: npm install -g firebase-tools
      - run: ./scripts/ci_env.sh
      - run: bundle exec fastlane ios distribute
"#;

const CI_ENV_SCRIPT: &str = r#"#!/usr/bin/env sh
# Populate fastlane/.env for {{app_name}} on CI runners.
set -eu

if [ -z "${FIREBASE_PROJECT_ID:-}" ]; then
  echo "FIREBASE_PROJECT_ID must be set" >&2
  exit 1
fi

shipwright firebase-sync --project-id "$FIREBASE_PROJECT_ID" --skip-groups
"#;
