//! Legacy semantic highlighting feature
//!
//! Old clangd servers push `textDocument/semanticHighlighting`
//! notifications carrying a compact binary token stream per line: base64
//! over 8-byte records, each a big-endian u32 start column followed by a
//! big-endian u32 packing the token length (high 16 bits) and a scope
//! table index (low 16 bits).
//!
//! Decoding is pure: the same bytes and scope table always produce the
//! same token sequence.

use base64::{Engine as _, engine::general_purpose};

use crate::error::{DecodeError, TeardownError};
use crate::features::FeatureKind;
use crate::infra::protocol::SemanticHighlightingParams;
use crate::models::highlight::{DecodedToken, HighlightKind, HighlightLine, ScopeTable};

const SCOPE_MASK: u32 = 0xFFFF;
const LEN_SHIFT: u32 = 16;
const RECORD_SIZE: usize = 8;

/// Decode a raw token buffer against the session scope table.
///
/// Trailing bytes short of a full record are ignored. A scope index with
/// no table entry is a malformed payload and fails the whole buffer.
pub fn decode_token_buffer(
    data: &[u8],
    scopes: &ScopeTable,
) -> Result<Vec<DecodedToken>, DecodeError> {
    let mut tokens = Vec::with_capacity(data.len() / RECORD_SIZE);
    for record in data.chunks_exact(RECORD_SIZE) {
        let start = u32::from_be_bytes([record[0], record[1], record[2], record[3]]);
        let packed = u32::from_be_bytes([record[4], record[5], record[6], record[7]]);
        let length = packed >> LEN_SHIFT;
        let scope_index = (packed & SCOPE_MASK) as u16;

        if scope_index as usize >= scopes.len() {
            return Err(DecodeError::ScopeIndexOutOfRange {
                index: scope_index,
                table_len: scopes.len(),
            });
        }
        let scope = scopes
            .primary(scope_index)
            .ok_or(DecodeError::EmptyScopeGroup { index: scope_index })?;

        tokens.push(DecodedToken {
            character: start,
            length,
            scope_index,
            kind: HighlightKind::from_scope(scope),
        });
    }
    Ok(tokens)
}

/// Decode the base64 token string of one line.
pub fn decode_tokens(tokens: &str, scopes: &ScopeTable) -> Result<Vec<DecodedToken>, DecodeError> {
    let data = general_purpose::STANDARD.decode(tokens)?;
    decode_token_buffer(&data, scopes)
}

pub struct SemanticHighlightingFeature {
    scope_table: ScopeTable,
    disposed: bool,
}

impl SemanticHighlightingFeature {
    pub fn new(scope_table: ScopeTable) -> Self {
        Self {
            scope_table,
            disposed: false,
        }
    }

    pub fn scope_table(&self) -> &ScopeTable {
        &self.scope_table
    }

    /// Decode one notification into display-ready lines. Each line
    /// replaces whatever the document previously had at that line number;
    /// nothing is diffed against earlier notifications.
    pub fn decode_notification(
        &self,
        params: &SemanticHighlightingParams,
    ) -> Result<Vec<HighlightLine>, DecodeError> {
        params
            .lines
            .iter()
            .map(|line| {
                Ok(HighlightLine {
                    line: line.line,
                    tokens: decode_tokens(&line.tokens, &self.scope_table)?,
                })
            })
            .collect()
    }

    pub(crate) fn dispose(&mut self) -> Result<(), TeardownError> {
        if self.disposed {
            return Err(TeardownError::new(
                FeatureKind::SemanticHighlighting,
                "already disposed",
            ));
        }
        self.disposed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::protocol::{
        SemanticHighlightingInformation, VersionedTextDocumentIdentifier,
    };

    fn table() -> ScopeTable {
        ScopeTable::new(vec![
            vec!["storage.type.primitive.cpp".into()],
            vec!["variable.other.cpp".into()],
            vec!["entity.name.type.class.cpp".into()],
        ])
    }

    /// Test-only inverse of the codec.
    fn encode(tokens: &[DecodedToken]) -> Vec<u8> {
        let mut data = Vec::with_capacity(tokens.len() * RECORD_SIZE);
        for token in tokens {
            data.extend_from_slice(&token.character.to_be_bytes());
            let packed = (token.length << LEN_SHIFT) | token.scope_index as u32;
            data.extend_from_slice(&packed.to_be_bytes());
        }
        data
    }

    #[test]
    fn test_known_wire_bytes() {
        // start=5, length=1, scopeIndex=2
        let data = [0x00, 0x00, 0x00, 0x05, 0x00, 0x01, 0x00, 0x02];
        let tokens = decode_token_buffer(&data, &table()).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].character, 5);
        assert_eq!(tokens[0].length, 1);
        assert_eq!(tokens[0].kind, HighlightKind::Class);
    }

    #[test]
    fn test_round_trip() {
        let original = vec![
            DecodedToken {
                character: 0,
                length: 3,
                scope_index: 0,
                kind: HighlightKind::Primitive,
            },
            DecodedToken {
                character: 4,
                length: 1,
                scope_index: 1,
                kind: HighlightKind::Variable,
            },
            DecodedToken {
                character: 10,
                length: 65_535,
                scope_index: 2,
                kind: HighlightKind::Class,
            },
        ];
        let decoded = decode_token_buffer(&encode(&original), &table()).unwrap();
        assert_eq!(decoded, original);

        let b64 = general_purpose::STANDARD.encode(encode(&original));
        assert_eq!(decode_tokens(&b64, &table()).unwrap(), original);
    }

    #[test]
    fn test_trailing_partial_record_is_ignored() {
        let mut data = encode(&[DecodedToken {
            character: 5,
            length: 1,
            scope_index: 2,
            kind: HighlightKind::Class,
        }]);
        let whole = decode_token_buffer(&data, &table()).unwrap();
        data.extend_from_slice(&[0x00, 0x00, 0x00]);
        let with_remainder = decode_token_buffer(&data, &table()).unwrap();
        assert_eq!(whole, with_remainder);
    }

    #[test]
    fn test_empty_buffer_decodes_to_no_tokens() {
        assert!(decode_token_buffer(&[], &table()).unwrap().is_empty());
        assert!(decode_tokens("", &table()).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_scope_index_is_malformed() {
        // scopeIndex=7 against a 3-entry table
        let data = [0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x07];
        let err = decode_token_buffer(&data, &table()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ScopeIndexOutOfRange { index: 7, table_len: 3 }
        ));
    }

    #[test]
    fn test_invalid_base64_is_malformed() {
        let err = decode_tokens("not valid base64!!!", &table()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidBase64(_)));
    }

    #[test]
    fn test_decode_notification() {
        let feature = SemanticHighlightingFeature::new(table());
        let tokens = general_purpose::STANDARD.encode(encode(&[DecodedToken {
            character: 5,
            length: 1,
            scope_index: 2,
            kind: HighlightKind::Class,
        }]));
        let params = SemanticHighlightingParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: "file:///a.cpp".to_string(),
                version: 3,
            },
            lines: vec![
                SemanticHighlightingInformation { line: 12, tokens },
                SemanticHighlightingInformation {
                    line: 13,
                    tokens: String::new(),
                },
            ],
        };
        let lines = feature.decode_notification(&params).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 12);
        assert_eq!(lines[0].tokens[0].kind, HighlightKind::Class);
        assert!(lines[1].tokens.is_empty());
    }
}
