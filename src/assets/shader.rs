//! Shader program sources and validation
//!
//! Programs are WGSL modules with a `vs_main` vertex stage and an `fs_main`
//! fragment stage. They are checked with naga before any backend sees them, so
//! a broken shader fails with a readable message instead of a device panic.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{ResourceBinding, ShaderStage};

use super::AssetError;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// (group, binding) pairs every program must declare
///
/// Group 0 holds per-object uniforms, group 1 the texture and its sampler.
pub const REQUIRED_BINDINGS: [(u32, u32); 3] = [(0, 0), (1, 0), (1, 1)];

/// Named WGSL module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub name: String,
    pub wgsl: String,
}

impl ProgramSource {
    pub fn new(name: impl Into<String>, wgsl: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wgsl: wgsl.into(),
        }
    }

    /// Blinn-Phong lit, optionally textured
    pub fn lit() -> Self {
        Self::new("lit", include_str!("shaders/lit.wgsl"))
    }

    /// Screen-space textured quad
    pub fn overlay() -> Self {
        Self::new("overlay", include_str!("shaders/overlay.wgsl"))
    }
}

/// Parse, validate and check the stage interface of a program
pub fn validate_program(source: &ProgramSource) -> Result<naga::Module, AssetError> {
    let compile_error = |message: String| AssetError::Compile {
        program: source.name.clone(),
        message,
    };
    let link_error = |message: String| AssetError::Link {
        program: source.name.clone(),
        message,
    };

    let module = naga::front::wgsl::parse_str(&source.wgsl)
        .map_err(|e| compile_error(e.emit_to_string(&source.wgsl)))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| compile_error(e.emit_to_string(&source.wgsl)))?;

    for (stage, name) in [
        (ShaderStage::Vertex, VERTEX_ENTRY),
        (ShaderStage::Fragment, FRAGMENT_ENTRY),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.stage == stage && ep.name == name);
        if !found {
            return Err(link_error(format!("missing {stage:?} entry point '{name}'")));
        }
    }

    for (group, binding) in REQUIRED_BINDINGS {
        let declared = module.global_variables.iter().any(|(_, var)| {
            var.binding == Some(ResourceBinding { group, binding })
        });
        if !declared {
            return Err(link_error(format!(
                "missing resource at group {group} binding {binding}"
            )));
        }
    }

    Ok(module)
}
