// Tue Jan 13 2026 - Alex

use crate::error::ParseError;
use crate::options::{LinkOptions, PackedVersion, Platform};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct StubSymbol {
    pub name: String,
    pub weak_def: bool,
    pub tlv: bool,
}

/// The interesting content of a text-based dylib stub. The dylib layer
/// turns one of these into the same representation a binary dylib gets.
#[derive(Debug, Clone, Default)]
pub struct TextStub {
    pub archs: Vec<String>,
    pub platform: Platform,
    pub install_name: String,
    pub current_version: PackedVersion,
    pub compatibility_version: PackedVersion,
    pub swift_version: u8,
    pub parent_umbrella: Option<String>,
    pub allowable_clients: Vec<String>,
    pub exports: Vec<StubSymbol>,
    pub reexported_libs: Vec<String>,
}

pub fn is_text_stub(data: &[u8]) -> bool {
    let text = match std::str::from_utf8(data) {
        Ok(t) => t,
        Err(_) => return false,
    };
    let head = text.trim_start();
    head.starts_with("---") && text.contains("install-name:")
}

fn parse_flow_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    inner
        .split(',')
        .map(|s| s.trim().trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_platform(value: &str) -> Platform {
    match value.trim() {
        "macosx" => Platform::MacOsx,
        "ios" => Platform::Ios,
        "watchos" => Platform::WatchOs,
        "tvos" => Platform::TvOs,
        _ => Platform::Unknown,
    }
}

/// Parses the line-oriented tapi format. Returns Ok(None) when the bytes
/// are not a text stub at all; a stub without a slice for the link
/// architecture is a mismatch error.
pub fn parse(
    data: &[u8],
    path: &Path,
    options: &LinkOptions,
) -> Result<Option<TextStub>, ParseError> {
    if !is_text_stub(data) {
        return Ok(None);
    }
    let text = std::str::from_utf8(data).expect("checked utf8 above");
    let malformed =
        |reason: &str| ParseError::malformed(path, format!("text stub: {}", reason));

    let mut stub = TextStub::default();
    let mut in_exports = false;
    // whether the current export group applies to the linked architecture
    let mut group_active = false;

    let arch_name = options.architecture.map(|a| a.name()).unwrap_or("");

    for raw in text.lines() {
        let line = raw.trim_end();
        if line == "---" || line.starts_with("--- !") || line == "..." {
            continue;
        }
        let indented = line.starts_with(' ') || line.starts_with('\t');
        let body = line.trim_start().trim_start_matches("- ");
        let (key, value) = match body.split_once(':') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => continue,
        };

        if !indented {
            in_exports = false;
            match key {
                "archs" | "targets" => stub.archs = parse_flow_list(value),
                "platform" => stub.platform = parse_platform(value),
                "install-name" => stub.install_name = value.trim_matches('\'').to_string(),
                "current-version" => {
                    stub.current_version = PackedVersion::parse(value)
                        .ok_or_else(|| malformed("bad current-version"))?
                }
                "compatibility-version" => {
                    stub.compatibility_version = PackedVersion::parse(value)
                        .ok_or_else(|| malformed("bad compatibility-version"))?
                }
                "swift-version" => {
                    stub.swift_version =
                        value.parse().map_err(|_| malformed("bad swift-version"))?
                }
                "parent-umbrella" => stub.parent_umbrella = Some(value.to_string()),
                "allowable-clients" => stub.allowable_clients = parse_flow_list(value),
                "exports" => in_exports = true,
                _ => {}
            }
            continue;
        }

        if !in_exports {
            continue;
        }
        match key {
            "archs" => {
                let archs = parse_flow_list(value);
                group_active = archs.iter().any(|a| a == arch_name);
            }
            "symbols" if group_active => {
                for name in parse_flow_list(value) {
                    stub.exports.push(StubSymbol {
                        name,
                        weak_def: false,
                        tlv: false,
                    });
                }
            }
            "weak-def-symbols" if group_active => {
                for name in parse_flow_list(value) {
                    stub.exports.push(StubSymbol {
                        name,
                        weak_def: true,
                        tlv: false,
                    });
                }
            }
            "thread-local-symbols" if group_active => {
                for name in parse_flow_list(value) {
                    stub.exports.push(StubSymbol {
                        name,
                        weak_def: false,
                        tlv: true,
                    });
                }
            }
            "re-exports" if group_active => {
                stub.reexported_libs.extend(parse_flow_list(value));
            }
            _ => {}
        }
    }

    if stub.install_name.is_empty() {
        return Err(malformed("missing install-name"));
    }
    if !stub.archs.iter().any(|a| a == arch_name) {
        return Err(ParseError::WrongArchitecture {
            path: path.to_path_buf(),
            file_arch: stub.archs.join(" "),
            arch: options.architecture_name(),
        });
    }
    Ok(Some(stub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Architecture;

    const SAMPLE: &str = "\
--- !tapi-tbd-v2
archs:           [ x86_64, arm64 ]
platform:        macosx
install-name:    /usr/lib/libsample.dylib
current-version: 2.1.0
compatibility-version: 1.0
exports:
  - archs:           [ x86_64, arm64 ]
    re-exports:      [ /usr/lib/libdep.dylib ]
    symbols:         [ _alpha, _beta ]
    weak-def-symbols: [ _gamma ]
  - archs:           [ arm64 ]
    symbols:         [ _arm_only ]
...
";

    fn options_for(arch: Architecture) -> LinkOptions {
        let mut options = LinkOptions::default();
        options.architecture = Some(arch);
        options
    }

    #[test]
    fn test_parses_stub() {
        let stub = parse(
            SAMPLE.as_bytes(),
            Path::new("libsample.tbd"),
            &options_for(Architecture::X86_64),
        )
        .unwrap()
        .unwrap();
        assert_eq!(stub.install_name, "/usr/lib/libsample.dylib");
        assert_eq!(stub.platform, Platform::MacOsx);
        assert_eq!(stub.current_version, PackedVersion::new(2, 1, 0));
        let names: Vec<&str> = stub.exports.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["_alpha", "_beta", "_gamma"]);
        assert!(stub.exports[2].weak_def);
        assert_eq!(stub.reexported_libs, vec!["/usr/lib/libdep.dylib"]);
    }

    #[test]
    fn test_arch_filtered_groups() {
        let stub = parse(
            SAMPLE.as_bytes(),
            Path::new("libsample.tbd"),
            &options_for(Architecture::Arm64),
        )
        .unwrap()
        .unwrap();
        let names: Vec<&str> = stub.exports.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"_arm_only"));
    }

    #[test]
    fn test_missing_arch_is_mismatch() {
        let err = parse(
            SAMPLE.as_bytes(),
            Path::new("libsample.tbd"),
            &options_for(Architecture::Arm),
        )
        .unwrap_err();
        assert!(err.is_architecture_mismatch());
    }

    #[test]
    fn test_not_a_stub() {
        assert!(parse(
            b"\x07\x01\x00\x00random",
            Path::new("x.o"),
            &options_for(Architecture::X86_64)
        )
        .unwrap()
        .is_none());
    }
}
