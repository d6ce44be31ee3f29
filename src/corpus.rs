/* ------------------------------------------------------------------ */
/* Corpus loader: one <category>.txt per language, one name per line  */
/* ------------------------------------------------------------------ */
//
// Category indices follow the *sorted* order of the file stems, not
// filesystem discovery order, so runs are reproducible across
// platforms. Lines that normalize to nothing are skipped; a category
// left with zero usable names cannot be sampled and is rejected at
// load time.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::alphabet::normalize;
use crate::rng::Rng;

#[derive(Debug)]
pub struct Corpus {
    categories: Vec<String>,
    names: Vec<Vec<String>>,
}

impl Corpus {
    /// Read every *.txt file in `dir`. Any I/O failure is fatal.
    pub fn load(dir: &Path) -> io::Result<Corpus> {
        let mut files: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push((stem.to_string(), path.clone()));
            }
        }
        if files.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no .txt category files found in {}", dir.display()),
            ));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut pairs = Vec::with_capacity(files.len());
        for (stem, path) in files {
            let file = File::open(&path)?;
            let mut lines = Vec::new();
            for line in BufReader::new(file).lines() {
                lines.push(line?);
            }
            pairs.push((stem, lines));
        }
        Corpus::from_parts(pairs)
    }

    /// Build a corpus from in-memory (category, raw names) pairs.
    /// Raw names go through the same normalization as file input.
    pub fn from_parts(pairs: Vec<(String, Vec<String>)>) -> io::Result<Corpus> {
        let mut categories = Vec::with_capacity(pairs.len());
        let mut names = Vec::with_capacity(pairs.len());
        for (category, raw) in pairs {
            let cleaned: Vec<String> = raw
                .iter()
                .map(|line| normalize(line.trim()))
                .filter(|n| !n.is_empty())
                .collect();
            if cleaned.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("category {:?} has no usable names", category),
                ));
            }
            categories.push(category);
            names.push(cleaned);
        }
        Ok(Corpus { categories, names })
    }

    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn names(&self, category: usize) -> &[String] {
        &self.names[category]
    }

    pub fn total_names(&self) -> usize {
        self.names.iter().map(|n| n.len()).sum()
    }

    /// Uniform category, then uniform name within it.
    pub fn sample<'a>(&'a self, rng: &mut Rng) -> (usize, &'a str) {
        let category = rng.choice(self.categories.len());
        let list = &self.names[category];
        (category, list[rng.choice(list.len())].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            let mut f = File::create(dir.path().join(name)).unwrap();
            write!(f, "{}", contents).unwrap();
        }
        dir
    }

    #[test]
    fn loads_sorted_categories_and_folds_names() {
        let dir = write_corpus_dir(&[
            ("Spanish.txt", "García\nLopez\n"),
            ("English.txt", "Smith\nJones\n"),
        ]);
        let corpus = Corpus::load(dir.path()).unwrap();
        assert_eq!(corpus.n_categories(), 2);
        assert_eq!(corpus.categories(), ["English", "Spanish"]);
        assert_eq!(corpus.names(1), ["Garcia", "Lopez"]);
        assert_eq!(corpus.total_names(), 4);
    }

    #[test]
    fn skips_blank_lines_and_non_txt_files() {
        let dir = write_corpus_dir(&[
            ("English.txt", "Smith\n\n\nJones\n"),
            ("notes.md", "not a category"),
        ]);
        let corpus = Corpus::load(dir.path()).unwrap();
        assert_eq!(corpus.n_categories(), 1);
        assert_eq!(corpus.names(0).len(), 2);
    }

    #[test]
    fn empty_category_is_rejected() {
        let dir = write_corpus_dir(&[
            ("English.txt", "Smith\n"),
            ("Martian.txt", "李\n北\n"),
        ]);
        let err = Corpus::load(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("Martian"));
    }

    #[test]
    fn empty_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Corpus::load(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_directory_is_fatal() {
        assert!(Corpus::load(Path::new("/nonexistent/names")).is_err());
    }

    #[test]
    fn sample_stays_within_category() {
        let corpus = Corpus::from_parts(vec![
            ("A".into(), vec!["aaa".into()]),
            ("B".into(), vec!["bbb".into(), "bbc".into()]),
        ])
        .unwrap();
        let mut rng = Rng::new(3);
        for _ in 0..200 {
            let (cat, name) = corpus.sample(&mut rng);
            assert!(corpus.names(cat).iter().any(|n| n == name));
        }
    }
}
