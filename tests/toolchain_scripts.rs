//! Toolchain probe and test compiler against a fake toolchain root.
//!
//! The fake `bin/go` is a shell script, so these tests only run on unix.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use abbench::core::BuildFlags;
use abbench::engine::{GoToolchain, Toolchain, compile_tests};
use tempfile::tempdir;

const FAKE_GO: &str = r#"#!/bin/sh
set -e
case "$1" in
  version)
    echo "  go version fake-$(basename "$GOROOT") linux/amd64  "
    ;;
  list)
    if [ "$2" = "std" ]; then
      printf 'bufio\ncmd/go\nencoding/json\ncmd/internal/obj\nfmt\n'
    else
      echo "$GOROOT/src/$4"
    fi
    ;;
  test)
    env | sort > "$GOROOT/last-build-env"
    echo "$@" > "$GOROOT/last-build-args"
    out="$6"
    pkg="$7"
    case "$pkg" in
      unsafe) exit 0 ;;
      broken) echo "cannot build $pkg"; exit 1 ;;
    esac
    printf '#!/bin/sh\necho PASS\n' > "$out"
    chmod +x "$out"
    ;;
  *)
    echo "unexpected: $*"
    exit 2
    ;;
esac
"#;

fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

fn fake_root(parent: &Path, name: &str) -> PathBuf {
    let root = parent.join(name);
    fs::create_dir_all(root.join("bin")).unwrap();
    write_executable(&root.join("bin/go"), FAKE_GO);
    root
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn version_is_trimmed() {
    let dir = tempdir().unwrap();
    let tc = GoToolchain::new(fake_root(dir.path(), "root-a"));
    assert_eq!(tc.version().unwrap(), "go version fake-root-a linux/amd64");
}

#[test]
fn list_std_drops_command_packages() {
    let dir = tempdir().unwrap();
    let tc = GoToolchain::new(fake_root(dir.path(), "root-a"));
    assert_eq!(tc.list_std().unwrap(), vec!["bufio", "encoding/json", "fmt"]);
}

#[test]
fn package_dir_comes_from_toolchain() {
    let dir = tempdir().unwrap();
    let root = fake_root(dir.path(), "root-a");
    let tc = GoToolchain::new(&root);
    assert_eq!(tc.package_dir("encoding/json").unwrap(), root.join("src/encoding/json"));
}

#[test]
fn missing_toolchain_root_is_fatal() {
    let dir = tempdir().unwrap();
    let tc = GoToolchain::new(dir.path().join("nope"));
    assert!(tc.version().is_err());
}

#[test]
fn compile_omits_packages_without_tests() {
    let dir = tempdir().unwrap();
    let root = fake_root(dir.path(), "root-b");
    let scratch = tempdir().unwrap();
    let tc = GoToolchain::new(&root);

    let tests = compile_tests(
        &tc,
        "after",
        &strings(&["fmt", "unsafe", "encoding/json"]),
        scratch.path(),
        &BuildFlags::default(),
    )
    .unwrap();

    assert_eq!(tests.len(), 2);
    assert!(!tests.contains("unsafe"));
    let json = tests.get("encoding/json").unwrap();
    assert_eq!(json.binary, scratch.path().join("after-encoding-json.test"));
    assert!(json.binary.exists());
    assert_eq!(json.dir, root.join("src/encoding/json"));
}

#[test]
fn build_failure_is_fatal() {
    let dir = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let tc = GoToolchain::new(fake_root(dir.path(), "root-a"));
    let err = compile_tests(
        &tc,
        "before",
        &strings(&["fmt", "broken"]),
        scratch.path(),
        &BuildFlags::default(),
    )
    .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("cannot build broken"), "{text}");
    assert!(text.contains("bin/go test -c"), "{text}");
}

#[test]
fn build_runs_in_isolated_environment_with_flags() {
    let dir = tempdir().unwrap();
    let root = fake_root(dir.path(), "root-a");
    let scratch = tempdir().unwrap();
    let tc = GoToolchain::new(&root);
    let flags = BuildFlags {
        ldflags: "-s -w".into(),
        gcflags: "-N".into(),
    };

    compile_tests(&tc, "before", &strings(&["fmt"]), scratch.path(), &flags).unwrap();

    let env = fs::read_to_string(root.join("last-build-env")).unwrap();
    assert!(env.lines().any(|l| l == format!("GOROOT={}", root.display())));
    let names: Vec<&str> = env.lines().filter_map(|l| l.split('=').next()).collect();
    for name in names {
        assert!(
            ["GOROOT", "PATH", "GOPATH", "HOME", "GOCACHE", "PWD", "SHLVL", "_", "OLDPWD"]
                .contains(&name),
            "unexpected variable {name} in build environment"
        );
    }

    let args = fs::read_to_string(root.join("last-build-args")).unwrap();
    assert!(args.starts_with("test -c -ldflags=-s -w -gcflags=-N -o "), "{args}");
    assert!(args.trim_end().ends_with("before-fmt.test fmt"), "{args}");
}
