use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_scene() -> NamedTempFile {
    let scene = r#"<scene>
  <object>
    <name>Camera</name>
    <type>camera</type>
    <position>0 2 -10</position>
  </object>
  <object>
    <name>Lamp</name>
    <type>light</type>
    <lightType>point</lightType>
    <position>0 1 0</position>
    <attenuation>1 3 4</attenuation>
  </object>
  <object>
    <name>Cube</name>
    <type>mesh</type>
    <color>255 0 0</color>
    <shininess>0.4</shininess>
  </object>
</scene>
"#;
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(scene.as_bytes()).expect("write scene");
    tmp
}

#[test]
fn header_declares_shared_types() {
    let mut cmd = Command::cargo_bin("hittest-layout").expect("binary exists");
    cmd.arg("header");
    cmd.assert()
        .success()
        .stdout(contains("#import <simd/simd.h>"))
        .stdout(contains("    Pointlight = 3,"))
        .stdout(contains("    matrix_float3x3 normalMatrix;"))
        .stdout(contains("} FragmentUniforms;"));
}

#[test]
fn layout_report_verifies_offsets() {
    let mut cmd = Command::cargo_bin("hittest-layout").expect("binary exists");
    cmd.arg("layout");
    cmd.assert()
        .success()
        .stdout(contains("Uniforms (240 bytes, 0 padding)"))
        .stdout(contains("Material (112 bytes, 20 padding)"))
        .stdout(contains("All layouts match the shader header"));
}

#[test]
fn encode_demo_reports_sizes() {
    let mut cmd = Command::cargo_bin("hittest-layout").expect("binary exists");
    cmd.arg("encode").arg("--demo").arg("--aspect").arg("1.5");
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 2 objects (2 lights)"))
        .stdout(contains(" - cube (mesh)"))
        .stdout(contains("Encoded 2 draw(s) and 2 light(s) into 992 bytes"));
}

#[test]
fn encoded_scene_dumps_back() {
    let scene = write_scene();
    let blob = NamedTempFile::new().expect("temp blob");

    let mut encode = Command::cargo_bin("hittest-layout").expect("binary exists");
    encode
        .arg("encode")
        .arg(scene.path())
        .arg("--output")
        .arg(blob.path());
    encode
        .assert()
        .success()
        .stdout(contains("Loaded scene with 3 objects (1 lights)"))
        .stdout(contains("Encoded 1 draw(s) and 1 light(s) into 512 bytes"));

    let mut dump = Command::cargo_bin("hittest-layout").expect("binary exists");
    dump.arg("dump").arg(blob.path());
    dump.assert()
        .success()
        .stdout(contains("Frame with 1 light(s) and 1 draw(s)"))
        .stdout(contains("  lightCount = 1"))
        .stdout(contains("  cameraPosition = (0.000, 2.000, -10.000)"))
        .stdout(contains("  type = Pointlight"))
        .stdout(contains("  attenuation = (1.000, 3.000, 4.000)"))
        .stdout(contains("  coneAngle = 0.000"))
        .stdout(contains("  baseColor = (1.000, 0.000, 0.000)"))
        .stdout(contains("  shininess = 0.400"));
}

#[test]
fn dump_rejects_garbage() {
    let mut tmp = NamedTempFile::new().expect("temp blob");
    tmp.write_all(&[0u8; 7]).expect("write blob");
    let mut cmd = Command::cargo_bin("hittest-layout").expect("binary exists");
    cmd.arg("dump").arg(tmp.path());
    cmd.assert()
        .failure()
        .stderr(contains("is not a frame blob"));
}

#[test]
fn missing_command_prints_usage() {
    let mut cmd = Command::cargo_bin("hittest-layout").expect("binary exists");
    cmd.assert().failure().stderr(contains("Usage: hittest-layout"));
}
