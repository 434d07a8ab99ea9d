//! Security Module
//!
//! 信頼できない入力ファイルを扱うための制限を実装するモジュール。
//! 入力サイズの上限、ZIP bomb対策、アーカイブ内パスのトラバーサル対策を提供します。

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::SheetToMdError;

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 1GB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824,
            max_file_count: 10_000,
            max_file_size: 104_857_600,
            max_input_file_size: 2_147_483_648,
        }
    }
}

impl SecurityConfig {
    /// 入力全体をメモリに読み込み、サイズ上限を検証する
    pub fn read_input<R: Read>(&self, mut reader: R) -> Result<Vec<u8>, SheetToMdError> {
        let mut buffer = Vec::new();
        // 上限+1バイトまでしか読まない
        let limit = self.max_input_file_size.saturating_add(1);
        let bytes_read = reader.by_ref().take(limit).read_to_end(&mut buffer)?;

        if bytes_read as u64 > self.max_input_file_size {
            return Err(SheetToMdError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, self.max_input_file_size
            )));
        }

        Ok(buffer)
    }

    /// ZIPアーカイブのエントリ数・サイズ・パスを検証する
    pub fn check_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<(), SheetToMdError> {
        if archive.len() > self.max_file_count {
            return Err(SheetToMdError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;

            let file_name = file.name();
            validate_zip_path(file_name).map_err(|e| {
                SheetToMdError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            let file_size = file.size();
            if file_size > self.max_file_size {
                return Err(SheetToMdError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, self.max_file_size
                )));
            }

            total_decompressed_size =
                total_decompressed_size
                    .checked_add(file_size)
                    .ok_or_else(|| {
                        SheetToMdError::SecurityViolation(
                            "Total decompressed size calculation overflow".to_string(),
                        )
                    })?;

            if total_decompressed_size > self.max_decompressed_size {
                return Err(SheetToMdError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// アーカイブ内ファイルパスの検証
///
/// `..`、絶対パス、バックスラッシュを含むパスを拒否します。
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    if path.starts_with('/') || path.starts_with("C:\\") || path.starts_with("c:\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.contains("..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::{FileOptions, ZipWriter};

    fn archive_with(entries: &[(&str, &[u8])]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            for (name, content) in entries {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(content).unwrap();
            }
            zip.finish().unwrap();
        }
        ZipArchive::new(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_validate_zip_path_valid() {
        assert!(validate_zip_path("xl/workbook.xml").is_ok());
        assert!(validate_zip_path("xl/worksheets/sheet1.xml").is_ok());
    }

    #[test]
    fn test_validate_zip_path_rejections() {
        assert!(validate_zip_path("").is_err());
        assert!(validate_zip_path("/etc/passwd").is_err());
        assert!(validate_zip_path("C:\\Windows\\system32").is_err());
        assert!(validate_zip_path("xl/../../etc/passwd").is_err());
        assert!(validate_zip_path("xl\\workbook.xml").is_err());
    }

    #[test]
    fn test_read_input_within_limit() {
        let config = SecurityConfig::default();
        let data = config.read_input(Cursor::new(vec![1u8, 2, 3])).unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_read_input_over_limit() {
        let config = SecurityConfig {
            max_input_file_size: 4,
            ..SecurityConfig::default()
        };
        let result = config.read_input(Cursor::new(vec![0u8; 10]));
        assert!(matches!(result, Err(SheetToMdError::SecurityViolation(_))));
    }

    #[test]
    fn test_check_archive_limits() {
        let mut archive = archive_with(&[("a.xml", b"1"), ("b.xml", b"2")]);
        assert!(SecurityConfig::default().check_archive(&mut archive).is_ok());

        let few_files = SecurityConfig {
            max_file_count: 1,
            ..SecurityConfig::default()
        };
        assert!(matches!(
            few_files.check_archive(&mut archive),
            Err(SheetToMdError::SecurityViolation(msg)) if msg.contains("too many files")
        ));

        let small_files = SecurityConfig {
            max_file_size: 2,
            ..SecurityConfig::default()
        };
        let mut big = archive_with(&[("big.xml", b"0123456789")]);
        assert!(matches!(
            small_files.check_archive(&mut big),
            Err(SheetToMdError::SecurityViolation(msg)) if msg.contains("exceeds maximum size")
        ));
    }
}
