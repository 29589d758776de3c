use super::Result;
use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

/// Resolves the `--reads` argument into a list of BAM paths.
///
/// A path ending in `.bam` names a single alignment file; any other path is
/// read as a text file listing one BAM path per line.
pub fn resolve_read_paths(reads_path: &Path) -> Result<Vec<PathBuf>> {
    let paths = if has_bam_extension(reads_path) {
        vec![reads_path.to_path_buf()]
    } else {
        let file = fs::File::open(reads_path)
            .map_err(|e| format!("Failed to open BAM list {}: {}", reads_path.display(), e))?;
        BufReader::new(file)
            .lines()
            .map_while(|l| l.ok())
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect()
    };

    if paths.is_empty() {
        return Err(format!("No BAM files listed in {}", reads_path.display()));
    }

    for path in &paths {
        if !has_bam_extension(path) {
            return Err(format!(
                "Input file '{}' has unrecognized extension",
                path.display()
            ));
        }
        if !path.exists() {
            return Err(format!("Input file '{}' does not exist", path.display()));
        }
        let bai_path = bai_companion(path);
        if !bai_path.exists() {
            return Err(format!(
                "Input file '{}' has no corresponding '.bai' index",
                path.display()
            ));
        }
    }

    Ok(paths)
}

/// Copies BAM files and their indexes into a scratch directory and returns
/// the new paths. Two inputs sharing a file name would overwrite each other
/// in the cache, so a collision is fatal.
pub fn cache_read_paths(paths: Vec<PathBuf>, cache_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(cache_dir)
        .map_err(|e| format!("Failed to create cache dir {}: {}", cache_dir.display(), e))?;

    let mut cached = Vec::with_capacity(paths.len());
    for path in paths {
        let file_name = path
            .file_name()
            .ok_or_else(|| format!("Invalid BAM path: {}", path.display()))?;
        let new_path = cache_dir.join(file_name);
        let new_bai = bai_companion(&new_path);
        if new_path.exists() || new_bai.exists() {
            return Err(
                "Cache file already exists. Does a filename appear twice in input?".to_string(),
            );
        }
        fs::copy(&path, &new_path).map_err(|e| format!("Failed to cache BAM: {}", e))?;
        fs::copy(bai_companion(&path), &new_bai)
            .map_err(|e| format!("Failed to cache BAM index: {}", e))?;
        cached.push(new_path);
    }

    Ok(cached)
}

fn has_bam_extension(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".bam")
}

fn bai_companion(path: &Path) -> PathBuf {
    let mut bai = path.as_os_str().to_owned();
    bai.push(".bai");
    PathBuf::from(bai)
}
