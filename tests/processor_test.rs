use jgen::error::Error;
use jgen::processor::{render, Output};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn jgen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jgen"))
}

#[test_log::test]
fn test_render_with_data_and_includes() {
    let root = TempDir::new().unwrap();
    let data = root.path().join("data");
    let include = root.path().join("include");
    write(&data, "service.yaml", "name: user_store\nmethods: [get_user, put_user]\n");
    write(&include, "guard.inc", "#pragma once\n");
    let template = write(
        root.path(),
        "service.h.in",
        "@[include 'guard.inc']\n\
         class @(data.service.name|typeify) {\n\
         @[for m in data.service.methods]\n\
         \x20 void @(m|varify)();\n\
         @[endfor]\n\
         };\n",
    );

    let out = render(template.to_str().unwrap(), &[&data], &[&include]).unwrap();
    assert_eq!(
        out,
        "#pragma once\nclass UserStore {\n  void get_user();\n  void put_user();\n};\n"
    );
}

#[test]
fn test_render_fails_before_rendering_on_bad_data() {
    let root = TempDir::new().unwrap();
    let data = root.path().join("data");
    write(&data, "bad.yaml", "a: [\n");
    let template = write(root.path(), "t.in", "@(data)\n");

    let no_includes: [&Path; 0] = [];
    let result = render(template.to_str().unwrap(), &[&data], &no_includes);
    assert!(matches!(result, Err(Error::DataParseError { .. })));
}

#[test]
fn test_output_file_creates_parent_dirs() {
    let root = TempDir::new().unwrap();
    let target = root.path().join("gen/nested/out.h");

    Output::File(target.clone()).write("generated\n").unwrap();
    assert_eq!(fs::read_to_string(target).unwrap(), "generated\n");
}

#[test]
fn test_cli_writes_output_file() {
    let root = TempDir::new().unwrap();
    let data = root.path().join("data");
    write(&data, "consts.yaml", "names: [max_size, buffer.len]\n");
    let template = write(
        root.path(),
        "consts.h.in",
        "@[for n in data.consts.names]\n#define @(n|constify) @(loop.index)\n@[endfor]\n",
    );
    let output = root.path().join("out/consts.h");

    let status = jgen()
        .arg(&template)
        .arg(&output)
        .arg("-d")
        .arg(&data)
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "#define MAX_SIZE 1\n#define BUFFER_LEN 2\n"
    );
}

#[test]
fn test_cli_defaults_to_stdout() {
    let root = TempDir::new().unwrap();
    let template = write(root.path(), "hello.in", "@[if data.missing is defined]x@[else]hello@[endif]\n");

    let output = jgen().arg(&template).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "hello\n");
}

#[test]
fn test_cli_syntax_error_writes_nothing() {
    let root = TempDir::new().unwrap();
    let template = write(root.path(), "broken.in", "line one\n@(data.x +)\n");
    let destination = root.path().join("out/broken.txt");

    let output = jgen().arg(&template).arg(&destination).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with(&format!("error: {}:2: ", template.display())), "{stderr}");
    assert!(!destination.exists());
}

#[test]
fn test_cli_missing_template_fails() {
    let root = TempDir::new().unwrap();
    let template = root.path().join("absent.in");

    let output = jgen().arg(&template).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr).unwrap().starts_with("error: "));
}
