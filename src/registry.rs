//! Named link diagrams stored outside the process.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::diagram::{GridDiagram, SavedGrid};
use crate::error::GridError;

/// Faults raised while looking up a stored diagram.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no link named `{0}`")]
    NotFound(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad registry format: {0}")]
    Format(#[from] serde_json::Error),

    #[error("entry `{name}` is not a grid diagram: {reason}")]
    Malformed { name: String, reason: String },
}

impl From<RegistryError> for GridError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(name) => GridError::NotFound(name),
            other => GridError::RegistryUnavailable(other.to_string()),
        }
    }
}

/// Source of persisted diagrams keyed by link name.
pub trait LinkRegistry {
    fn lookup(&self, name: &str) -> Result<SavedGrid, RegistryError>;
}

/// An in-memory registry loaded from a JSON object mapping each name to
/// `[[x_rows...], [o_rows...]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonRegistry {
    links: BTreeMap<String, SavedGrid>,
}

impl JsonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let file = File::open(path.as_ref())?;
        let registry = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.as_ref().display(),
            links = registry.links.len(),
            "opened link registry"
        );
        Ok(registry)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, RegistryError> {
        let links = serde_json::from_reader(reader)?;
        Ok(Self { links })
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let links = serde_json::from_str(json)?;
        Ok(Self { links })
    }

    /// Stores `diagram` under `name`, returning the entry it replaced.
    pub fn insert(&mut self, name: impl Into<String>, diagram: &GridDiagram) -> Option<SavedGrid> {
        self.links.insert(name.into(), diagram.saved())
    }

    /// Link names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn to_writer(&self, writer: impl Write) -> Result<(), RegistryError> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, &self.links)?;
        writer.flush()?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        self.to_writer(File::create(path)?)
    }
}

impl LinkRegistry for JsonRegistry {
    fn lookup(&self, name: &str) -> Result<SavedGrid, RegistryError> {
        self.links
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}

impl GridDiagram {
    /// Loads the diagram stored under `name`.
    ///
    /// A missing name is [`GridError::NotFound`]; any other fault, including
    /// a stored entry that is not a valid grid diagram, is
    /// [`GridError::RegistryUnavailable`].
    pub fn from_registry<R: LinkRegistry + ?Sized>(
        registry: &R,
        name: &str,
    ) -> Result<Self, GridError> {
        let saved = registry.lookup(name).map_err(|err| {
            if !matches!(err, RegistryError::NotFound(_)) {
                warn!(link = name, error = %err, "link registry lookup failed");
            }
            GridError::from(err)
        })?;
        let diagram = GridDiagram::from_saved(&saved).map_err(|err| {
            let err = RegistryError::Malformed {
                name: name.to_string(),
                reason: err.to_string(),
            };
            warn!(link = name, error = %err, "link registry lookup failed");
            GridError::from(err)
        })?;
        debug!(link = name, size = diagram.size(), "loaded link from registry");
        Ok(diagram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKS: &str = r#"{
        "unknot": [[0, 1], [1, 0]],
        "trefoil": [[0, 1, 2, 3, 4], [2, 3, 4, 0, 1]],
        "broken": [[0, 0], [1, 1]]
    }"#;

    struct Unreachable;

    impl LinkRegistry for Unreachable {
        fn lookup(&self, _name: &str) -> Result<SavedGrid, RegistryError> {
            Err(RegistryError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "database offline",
            )))
        }
    }

    #[test]
    fn loads_named_links() {
        let registry = JsonRegistry::from_json(LINKS).unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["broken", "trefoil", "unknot"]
        );
        let trefoil = GridDiagram::from_registry(&registry, "trefoil").unwrap();
        assert_eq!(trefoil.size(), 5);
        assert_eq!(trefoil.writhe(), -3);
        let unknot = GridDiagram::from_registry(&registry, "unknot").unwrap();
        assert_eq!(unknot.to_string(), "\nXO\nOX\n");
    }

    #[test]
    fn missing_name_is_not_found() {
        let registry = JsonRegistry::from_json(LINKS).unwrap();
        assert_eq!(
            GridDiagram::from_registry(&registry, "figure-eight"),
            Err(GridError::NotFound("figure-eight".to_string()))
        );
    }

    #[test]
    fn faults_are_reported_not_fatal() {
        let registry = JsonRegistry::from_json(LINKS).unwrap();
        assert!(matches!(
            GridDiagram::from_registry(&registry, "broken"),
            Err(GridError::RegistryUnavailable(_))
        ));
        assert!(matches!(
            GridDiagram::from_registry(&Unreachable, "unknot"),
            Err(GridError::RegistryUnavailable(_))
        ));
        assert!(matches!(
            JsonRegistry::from_json("{\"unknot\": 3}"),
            Err(RegistryError::Format(_))
        ));
        assert!(matches!(
            JsonRegistry::open("/nonexistent/links.json"),
            Err(RegistryError::Io(_))
        ));
    }

    #[test]
    fn written_registry_reads_back() {
        let mut registry = JsonRegistry::new();
        let trefoil = GridDiagram::new(&[0, 1, 2, 3, 4], &[2, 3, 4, 0, 1]).unwrap();
        assert!(registry.insert("trefoil", &trefoil).is_none());
        assert!(registry.insert("trefoil", &trefoil).is_some());

        let mut buf = Vec::new();
        registry.to_writer(&mut buf).unwrap();
        let back = JsonRegistry::from_reader(buf.as_slice()).unwrap();
        assert_eq!(back, registry);
        assert_eq!(GridDiagram::from_registry(&back, "trefoil").unwrap(), trefoil);
    }
}
