use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

/// Guess the transport encoding of a file.
///
/// Catalog files come back from translators and their editors in whatever
/// the platform default was; BOMs are authoritative, everything else goes
/// through statistical detection.
pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    Ok(detect(&bytes))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let name = encoding.name().to_lowercase();
        return EncodingDetectionResult {
            best: name.clone(),
            confidence: 0.99,
            candidates: vec![EncodingCandidate {
                name,
                confidence: 0.99,
            }],
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);

    let encoding = detector.guess(None, true);
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    // XML without a BOM is overwhelmingly utf-8; keep it as a fallback
    // candidate when the detector picked a legacy single-byte encoding.
    if best != "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8".into(),
            confidence: (confidence - 0.10).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        candidates,
    }
}

/// Read a text file, honoring a BOM and falling back to detection.
pub fn read_to_string(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;

    let encoding = match Encoding::for_bom(&bytes) {
        Some((encoding, _)) => encoding,
        None => {
            let mut detector = EncodingDetector::new();
            detector.feed(&bytes, true);
            detector.guess(None, true)
        }
    };

    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(format!(
            "failed to decode {} as {}",
            path.display(),
            encoding.name()
        ));
    }

    Ok(text.into_owned())
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn utf8_bom_wins() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<TS version=\"2.1\"/>".as_bytes());
        let result = detect(&bytes);
        assert_eq!(result.best, "utf-8");
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn reads_utf16le_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ts");

        let text = "<TS version=\"2.1\" language=\"de\"></TS>";
        let mut bytes: Vec<u8> = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(&bytes).unwrap();

        let decoded = read_to_string(&path).unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn reads_plain_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ts");
        fs::write(&path, "<TS version=\"2.1\"></TS>").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "<TS version=\"2.1\"></TS>");
    }
}
