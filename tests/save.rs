use dashdata::io::{load, save};
use dashdata::{ConvertError, Header, Row, Stage};
use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;

fn rows(cols: &[&str], data: &[&[&str]]) -> Vec<Row> {
    let header = Arc::new(Header::new(cols.iter().copied()));
    data.iter()
        .map(|vals| {
            Row::new(
                Arc::clone(&header),
                vals.iter().map(|v| v.to_string()).collect(),
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn writes_string_valued_objects_in_order() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("data.json");
    let data = rows(
        &["age", "sex", "cogstat", "uresidence", "los"],
        &[
            &["70", "F", "normal", "home", "12"],
            &["91", "M", "impaired", "care", ""],
        ],
    );

    let n = save(&data, &path)?;
    assert_eq!(n, 2);

    let back: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(
        back,
        json!([
            {"age": "70", "sex": "F", "cogstat": "normal", "uresidence": "home", "los": "12"},
            {"age": "91", "sex": "M", "cogstat": "impaired", "uresidence": "care", "los": ""},
        ])
    );
    Ok(())
}

#[test]
fn empty_dataset_is_empty_array() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("data.json");
    save(&[], &path)?;
    assert_eq!(fs::read_to_string(&path)?.trim_end(), "[]");
    Ok(())
}

#[test]
fn overwrites_existing_file() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("data.json");
    fs::write(&path, "x".repeat(4096))?;

    save(&rows(&["age"], &[&["70"]]), &path)?;
    let text = fs::read_to_string(&path)?;
    assert!(!text.contains('x'));
    let back: Value = serde_json::from_str(&text)?;
    assert_eq!(back, json!([{"age": "70"}]));
    Ok(())
}

#[test]
fn missing_parent_directory_is_write_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("no-such-dir").join("data.json");
    let err = save(&rows(&["age"], &[&["70"]]), &path).unwrap_err();
    assert!(matches!(err, ConvertError::Write { .. }));
    assert_eq!(err.stage(), Stage::Save);
    assert!(err.to_string().contains("no-such-dir"));
    assert!(!path.exists());
}

#[test]
fn cell_values_survive_unchanged() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv = tmp.path().join("in.csv");
    fs::write(
        &csv,
        "age,sex,cogstat,uresidence,note\n\
         0070,F,normal,home,\"said \"\"ouch\"\", then \u{e9}\"\n",
    )?;
    let out = tmp.path().join("out.json");
    save(&load(&csv)?, &out)?;

    let back: Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(back[0]["age"], "0070");
    assert_eq!(back[0]["note"], "said \"ouch\", then \u{e9}");
    Ok(())
}

#[test]
fn output_is_indented() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("data.json");
    save(&rows(&["age", "sex"], &[&["70", "F"]]), &path)?;
    assert_eq!(
        fs::read_to_string(&path)?,
        "[\n  {\n    \"age\": \"70\",\n    \"sex\": \"F\"\n  }\n]\n"
    );
    Ok(())
}

#[cfg(any(
    feature = "compression-gzip",
    feature = "compression-zstd",
    feature = "compression-bzip2",
    feature = "compression-xz"
))]
mod compressed {
    use super::*;
    use std::io::Read;

    fn cohort() -> Vec<Row> {
        rows(
            &["age", "sex", "cogstat", "uresidence", "note"],
            &[
                &["70", "F", "normal", "home", "café"],
                &["88", "M", "impaired", "care", ""],
            ],
        )
    }

    /// Save `cohort()` as `out.json.<ext>` and as plain JSON, decode the
    /// compressed file with `decode`, and check both parse to the same array.
    fn assert_matches_plain<F>(ext: &str, decode: F) -> anyhow::Result<()>
    where
        F: FnOnce(fs::File) -> std::io::Result<Box<dyn Read>>,
    {
        let tmp = tempfile::tempdir()?;
        let plain = tmp.path().join("out.json");
        let packed = tmp.path().join(format!("out.json.{ext}"));
        assert_eq!(save(&cohort(), &plain)?, 2);
        assert_eq!(save(&cohort(), &packed)?, 2);

        let raw = fs::read(&packed)?;
        assert_ne!(raw, fs::read(&plain)?);

        let mut text = String::new();
        decode(fs::File::open(&packed)?)?.read_to_string(&mut text)?;
        let expected: Value = serde_json::from_str(&fs::read_to_string(&plain)?)?;
        let got: Value = serde_json::from_str(&text)?;
        assert_eq!(got, expected);
        assert!(text.ends_with("]\n"));
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_output_round_trips() -> anyhow::Result<()> {
        assert_matches_plain("gz", |f| {
            Ok(Box::new(flate2::read::MultiGzDecoder::new(f)) as Box<dyn Read>)
        })
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn zstd_output_round_trips() -> anyhow::Result<()> {
        assert_matches_plain("zst", |f| {
            Ok(Box::new(zstd::stream::read::Decoder::new(f)?) as Box<dyn Read>)
        })
    }

    #[cfg(feature = "compression-bzip2")]
    #[test]
    fn bzip2_output_round_trips() -> anyhow::Result<()> {
        assert_matches_plain("bz2", |f| {
            Ok(Box::new(bzip2::read::MultiBzDecoder::new(f)) as Box<dyn Read>)
        })
    }

    #[cfg(feature = "compression-xz")]
    #[test]
    fn xz_output_round_trips() -> anyhow::Result<()> {
        assert_matches_plain("xz", |f| {
            Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(f)) as Box<dyn Read>)
        })
    }
}
