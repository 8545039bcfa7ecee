// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_rebalancer_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid file format: bad header");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("buffer overflow".into());
        assert_eq!(err.to_string(), "Serialization error: buffer overflow");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn validation() {
        let err = CoreError::ValidationError("Price must be positive, got 0".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: Price must be positive, got 0"
        );
    }

    #[test]
    fn duplicate_asset() {
        let err = CoreError::DuplicateAsset("Gold".into());
        assert_eq!(err.to_string(), "An asset named 'Gold' already exists");
    }

    #[test]
    fn asset_not_found() {
        let err = CoreError::AssetNotFound("index 4".into());
        assert_eq!(err.to_string(), "Asset not found: index 4");
    }

    #[test]
    fn invalid_allocation_two_decimals() {
        let err = CoreError::InvalidAllocation { total: 99.0 };
        assert_eq!(
            err.to_string(),
            "Target allocations sum to 99.00%, expected 100%"
        );
        let err = CoreError::InvalidAllocation { total: 100.456 };
        assert!(err.to_string().contains("100.46%"));
    }

    #[test]
    fn nothing_to_apply() {
        let err = CoreError::NothingToApply;
        assert_eq!(
            err.to_string(),
            "No rebalance actions to apply — run a rebalance first"
        );
    }
}

// ── From conversions ────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: CoreError = io.into();
        match err {
            CoreError::FileIO(msg) => assert!(msg.contains("no such file")),
            other => panic!("expected FileIO, got {other:?}"),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_propagates_io() {
        fn read() -> Result<Vec<u8>, CoreError> {
            Ok(std::fs::read("/definitely/not/a/real/path.json")?)
        }
        assert!(matches!(read(), Err(CoreError::FileIO(_))));
    }

    #[test]
    fn errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<CoreError>();
    }
}
