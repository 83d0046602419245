use std::{fs, path::Path};

use crate::{DomainSpec, MdpError, OoState};

/// Load and validate a domain spec from YAML on disk.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<DomainSpec, MdpError> {
    let yaml = fs::read_to_string(path)?;
    let spec: DomainSpec = serde_yaml::from_str(&yaml)?;
    spec.validate()?;
    Ok(spec)
}

/// Serialize and write a domain spec to YAML.
pub fn save_yaml(path: impl AsRef<Path>, spec: &DomainSpec) -> Result<(), MdpError> {
    let yaml = serde_yaml::to_string(spec)?;
    fs::write(path, yaml)?;
    Ok(())
}

/// Load a state from YAML and check it against `spec`.
pub fn load_state_yaml(path: impl AsRef<Path>, spec: &DomainSpec) -> Result<OoState, MdpError> {
    let yaml = fs::read_to_string(path)?;
    let state: OoState = serde_yaml::from_str(&yaml)?;
    spec.validate_state(&state)?;
    Ok(state)
}
