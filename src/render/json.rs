use log::{debug, info};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::{
    processor::Result,
    render::{ChartSpec, Renderer},
};

/// Writes each chart as `<dir>/<name>.json`
#[derive(Debug)]
pub struct JsonRenderer {
    out_dir: PathBuf,
    compact: bool,
    written: Vec<PathBuf>,
}

impl JsonRenderer {
    /// Creates `out_dir` if needed
    pub fn new(out_dir: &Path, compact: bool) -> Result<Self> {
        fs::create_dir_all(out_dir)?;
        Ok(JsonRenderer {
            out_dir: out_dir.to_path_buf(),
            compact,
            written: Vec::new(),
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Writes any serializable value next to the charts
    pub fn write_json<T: serde::Serialize>(&mut self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.out_dir.join(format!("{name}.json"));
        let file = fs::File::create(&path)?;
        write_value(file, value, self.compact)?;
        debug!("wrote {}", path.display());
        self.written.push(path.clone());
        Ok(path)
    }
}

/// Serializes `value` through a buffer; the final flush error is returned
fn write_value<W, T>(inner: W, value: &T, compact: bool) -> Result<()>
where
    W: Write,
    T: serde::Serialize + ?Sized,
{
    let mut writer = io::BufWriter::new(inner);
    if compact {
        serde_json::to_writer(&mut writer, value)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, value)?;
    }
    writer.flush()?;
    Ok(())
}

impl Renderer for JsonRenderer {
    fn render(&mut self, name: &str, chart: &ChartSpec) -> Result<()> {
        if chart.is_empty() {
            info!("{name}: no data");
            return Ok(());
        }
        self.write_json(name, chart)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::AnalysisError;
    use crate::render::{ChartData, RenderConfig};

    /// Accepts nothing, like a full disk
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_flush_is_reported() {
        let bars = vec![("feminino".to_string(), 0.3)];
        for compact in [true, false] {
            assert!(matches!(
                write_value(FullDisk, &bars, compact),
                Err(AnalysisError::Io(_))
            ));
        }
        let mut out = Vec::new();
        write_value(&mut out, &bars, true).unwrap();
        assert_eq!(out, br#"[["feminino",0.3]]"#);
    }

    #[test]
    fn test_writes_non_empty_charts_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = JsonRenderer::new(&dir.path().join("charts"), true).unwrap();

        let empty = ChartSpec::new("vazio", ChartData::Bar(Vec::new()), &RenderConfig::default());
        renderer.render("vazio", &empty).unwrap();
        assert!(renderer.written().is_empty());

        let bar = ChartSpec::new(
            "genero",
            ChartData::Bar(vec![("feminino".into(), 0.3), ("masculino".into(), 0.7)]),
            &RenderConfig::default(),
        );
        renderer.render("genero", &bar).unwrap();
        assert_eq!(renderer.written().len(), 1);

        let text = fs::read_to_string(&renderer.written()[0]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["title"], "genero");
        assert_eq!(json["data"]["data"][1][1], 0.7);
    }
}
