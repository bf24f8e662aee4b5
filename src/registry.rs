use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use noodles::fasta::{
    self as fasta,
    record::{definition::ParseError, Definition},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not read genome source {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("genome source {0} contains no usable genomes")]
    EmptySource(PathBuf),
}

// How a FASTA identifier is turned into the genome name used as the lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    // Everything before the first occurrence of the delimiter.
    Prefix(char),
    // The identifier as-is.
    Whole,
}

impl Default for NameRule {
    fn default() -> Self {
        Self::Prefix('_')
    }
}

impl NameRule {
    // Returns None when the identifier has no delimiter (a MalformedIdentifier)
    // or when the resulting name would be empty.
    pub fn genome_name<'a>(&self, identifier: &'a str) -> Option<&'a str> {
        let name = match self {
            Self::Prefix(delimiter) => identifier.split_once(*delimiter)?.0,
            Self::Whole => identifier,
        };
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeEntry {
    name: String,
    sequence: Vec<u8>,
}

impl GenomeEntry {
    // The sequence is upper-cased on the way in. Empty sequences are refused
    // so that every entry has a length of at least 1.
    pub fn new(name: impl Into<String>, sequence: &[u8]) -> Option<Self> {
        if sequence.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            sequence: sequence.to_ascii_uppercase(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

// The Registry holds every genome of the source FASTA keyed by genome name.
// It is built once and only read afterwards.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Registry {
    genomes: HashMap<String, GenomeEntry>,
}

impl Registry {
    // Load a FASTA file from disk. Failing to open or parse the file is fatal,
    // and so is a file without a single usable genome.
    pub fn load(path: &Path, rule: NameRule) -> Result<Self, RegistryError> {
        let unreadable = |source| RegistryError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unreadable)?;
        let registry = Self::from_reader(BufReader::new(file), rule).map_err(unreadable)?;
        if registry.is_empty() {
            return Err(RegistryError::EmptySource(path.to_path_buf()));
        }
        info!(
            "loaded {} genome(s) from {}",
            registry.len(),
            path.display()
        );
        debug!("genome names: {:?}", registry.names());
        Ok(registry)
    }

    // Build a Registry from any FASTA stream. Records whose header has no
    // identifier, whose identifier does not yield a genome name, or whose
    // sequence is empty are skipped with a warning. A repeated genome name
    // replaces the earlier entry. Input that is not FASTA at all (a header line
    // without '>') is an error.
    pub fn from_reader<R: BufRead>(reader: R, rule: NameRule) -> io::Result<Self> {
        let mut reader = fasta::Reader::new(reader);
        let mut genomes = HashMap::new();
        let mut header = String::new();
        let mut sequence = Vec::new();

        loop {
            header.clear();
            if reader.read_definition(&mut header)? == 0 {
                break;
            }
            sequence.clear();
            reader.read_sequence(&mut sequence)?;

            let definition = match header.parse::<Definition>() {
                Ok(definition) => definition,
                Err(ParseError::MissingName) => {
                    warn!("MalformedIdentifier: header '{header}' has no identifier, skipping");
                    continue;
                }
                Err(ParseError::Empty) if sequence.is_empty() => continue,
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            };
            let identifier = definition.name();
            let Some(name) = rule.genome_name(identifier) else {
                warn!("MalformedIdentifier: '{identifier}' has no genome name under {rule:?}, skipping");
                continue;
            };
            let Some(entry) = GenomeEntry::new(name, &sequence) else {
                warn!("genome '{name}' ('{identifier}') has an empty sequence, skipping");
                continue;
            };
            if genomes.insert(name.to_string(), entry).is_some() {
                warn!("genome '{name}' defined more than once, keeping the later definition");
            }
        }

        Ok(Self { genomes })
    }

    pub fn get(&self, name: &str) -> Option<&GenomeEntry> {
        self.genomes.get(name)
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    // Genome names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.genomes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const SOURCE: &[u8] = b">AMDV_1 first genome
acgtac
GTAC
>NC076022.1_x
TTTT
>nodelimiter
GGGG
";

    #[rstest]
    #[case(NameRule::Prefix('_'), "AMDV_1_620", Some("AMDV"))]
    #[case(NameRule::Prefix('_'), "NC076022.1_x", Some("NC076022.1"))]
    #[case(NameRule::Prefix('_'), "AMDV", None)]
    #[case(NameRule::Prefix('_'), "_leading", None)]
    #[case(NameRule::Prefix('|'), "gi|123", Some("gi"))]
    #[case(NameRule::Whole, "AMDV_1", Some("AMDV_1"))]
    fn genome_name_rules(
        #[case] rule: NameRule,
        #[case] identifier: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(rule.genome_name(identifier), expected);
    }

    #[test]
    fn loads_uppercased_entries_and_skips_malformed_identifiers() {
        let registry = Registry::from_reader(SOURCE, NameRule::default()).unwrap();

        assert_eq!(registry.names(), vec!["AMDV", "NC076022.1"]);
        let amdv = registry.get("AMDV").unwrap();
        assert_eq!(amdv.name(), "AMDV");
        assert_eq!(amdv.sequence(), b"ACGTACGTAC");
        assert_eq!(amdv.len(), 10);
        assert!(registry.get("nodelimiter").is_none());
    }

    #[test]
    fn whole_identifier_rule_keeps_everything() {
        let registry = Registry::from_reader(SOURCE, NameRule::Whole).unwrap();
        assert_eq!(registry.names(), vec!["AMDV_1", "NC076022.1_x", "nodelimiter"]);
    }

    #[test]
    fn later_duplicate_replaces_earlier() {
        let source = b">HBV_a\nAAAA\n>HBV_b\nCCCCCC\n".as_slice();
        let first = Registry::from_reader(source, NameRule::default()).unwrap();
        let second = Registry::from_reader(source, NameRule::default()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first.get("HBV").unwrap().sequence(), b"CCCCCC");
    }

    #[test]
    fn empty_sequences_are_dropped() {
        let registry =
            Registry::from_reader(b">A_1\n>B_1\nAC\n".as_slice(), NameRule::default()).unwrap();
        assert_eq!(registry.names(), vec!["B"]);
    }

    #[test]
    fn header_without_identifier_skips_only_that_record() {
        let registry =
            Registry::from_reader(b">\nACGT\n>A_1\nAC\n".as_slice(), NameRule::default()).unwrap();
        assert_eq!(registry.names(), vec!["A"]);

        let registry =
            Registry::from_reader(b"> desc only\nACGT\n>A_1\nAC\n".as_slice(), NameRule::default())
                .unwrap();
        assert_eq!(registry.names(), vec!["A"]);
    }

    #[test]
    fn leading_blank_line_is_ignored() {
        let registry =
            Registry::from_reader(b"\n>A_1\nAC\n".as_slice(), NameRule::default()).unwrap();
        assert_eq!(registry.names(), vec!["A"]);
    }

    #[test]
    fn non_fasta_content_is_unreadable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ACGT\n>A_1\nAC\n").unwrap();

        let err = Registry::load(file.path(), NameRule::default()).unwrap_err();
        assert!(matches!(err, RegistryError::SourceUnreadable { .. }));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = Registry::load(Path::new("/nonexistent/genomes.fa"), NameRule::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::SourceUnreadable { .. }));
    }

    #[test]
    fn file_without_usable_genomes_is_empty_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b">nodelimiter\nACGT\n").unwrap();

        let err = Registry::load(file.path(), NameRule::default()).unwrap_err();
        assert!(matches!(err, RegistryError::EmptySource(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SOURCE).unwrap();

        let registry = Registry::load(file.path(), NameRule::default()).unwrap();
        assert_eq!(registry.len(), 2);
    }
}
