//! In-memory implementation of the external metadata protocol.
//!
//! Faithful enough for tests and the dev node: records, master records,
//! both verification paths, and a configurable set of recognized rotation
//! call identifiers so the versioned-dispatch fallback can be exercised
//! against "old" and "new" deployments. In production the adapter would
//! dispatch to the real protocol over the substrate's call interface; the
//! registry cannot tell the difference, which is the point.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use ember_protocol::address::Address;
use ember_protocol::config::{MAX_CREATOR_LIMIT, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, METADATA_MAX_URI_LENGTH};

use super::adapter::{MetadataError, MetadataProtocol, RotationCall};
use super::types::{
    CollectionRef, CollectionSizing, CreateMetadataArgs, MasterRecord, MetadataRecord,
};

/// In-memory metadata protocol state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMetadata {
    records: HashMap<Address, MetadataRecord>,
    masters: HashMap<Address, MasterRecord>,
    /// Which rotation call identifiers this "deployment" recognizes.
    rotation_calls: HashSet<RotationCall>,
}

impl Default for MemoryMetadata {
    /// A current-generation deployment: canonical rotation call only.
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            masters: HashMap::new(),
            rotation_calls: HashSet::from([RotationCall::V2]),
        }
    }
}

impl MemoryMetadata {
    /// Creates a current-generation deployment (recognizes only
    /// [`RotationCall::V2`]).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pre-rename deployment that recognizes only
    /// [`RotationCall::Legacy`]. Exists so the fallback path has something
    /// real to fall back against.
    pub fn legacy_only() -> Self {
        Self {
            rotation_calls: HashSet::from([RotationCall::Legacy]),
            ..Self::default()
        }
    }

    /// Registers a collection anchor: a metadata record with the given
    /// sizing plus a supply-fixing master record, owned by `authority`.
    ///
    /// This is setup the *anchor's owner* performs outside the registry;
    /// it exists here because tests and the dev node have to play that
    /// role themselves.
    pub fn register_collection_anchor(
        &mut self,
        anchor_mint: Address,
        authority: Address,
        sizing: CollectionSizing,
    ) {
        self.records.insert(
            anchor_mint,
            MetadataRecord {
                mint: anchor_mint,
                update_authority: authority,
                name: "Collection".into(),
                symbol: "COLL".into(),
                uri: String::new(),
                seller_fee_basis_points: 0,
                creators: Vec::new(),
                collection: None,
                is_mutable: true,
                sizing,
            },
        );
        self.masters.insert(
            anchor_mint,
            MasterRecord {
                mint: anchor_mint,
                max_prints: 0,
            },
        );
    }

    /// Inserts a raw record without a master. For tests that need anchors
    /// in unusual shapes (e.g. unsized without a fixed supply).
    pub fn insert_record(&mut self, record: MetadataRecord) {
        self.records.insert(record.mint, record);
    }

    /// Whether a master record exists for `mint`.
    pub fn has_master_record(&self, mint: &Address) -> bool {
        self.masters.contains_key(mint)
    }

    fn record_mut_checked(
        &mut self,
        mint: &Address,
        authority: &Address,
    ) -> Result<&mut MetadataRecord, MetadataError> {
        let record = self
            .records
            .get_mut(mint)
            .ok_or(MetadataError::RecordNotFound(*mint))?;
        if record.update_authority != *authority {
            return Err(MetadataError::AuthorityMismatch { mint: *mint });
        }
        Ok(record)
    }

    fn mark_item_verified(
        &mut self,
        item_mint: &Address,
        anchor_mint: &Address,
    ) -> Result<(), MetadataError> {
        let item = self
            .records
            .get_mut(item_mint)
            .ok_or(MetadataError::RecordNotFound(*item_mint))?;

        match item.collection {
            Some(CollectionRef { key, verified }) if key == *anchor_mint => {
                if verified {
                    return Err(MetadataError::AlreadyVerified(*item_mint));
                }
                item.collection = Some(CollectionRef {
                    key,
                    verified: true,
                });
                Ok(())
            }
            _ => Err(MetadataError::CollectionMismatch {
                item: *item_mint,
                anchor: *anchor_mint,
            }),
        }
    }
}

impl MetadataProtocol for MemoryMetadata {
    fn create_metadata(&mut self, args: CreateMetadataArgs) -> Result<(), MetadataError> {
        if self.records.contains_key(&args.mint) {
            return Err(MetadataError::RecordAlreadyExists(args.mint));
        }
        // The protocol enforces its own caps independently of whatever the
        // caller already validated.
        if args.name.len() > MAX_NAME_LENGTH {
            return Err(MetadataError::FieldTooLong {
                field: "name",
                max: MAX_NAME_LENGTH,
            });
        }
        if args.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(MetadataError::FieldTooLong {
                field: "symbol",
                max: MAX_SYMBOL_LENGTH,
            });
        }
        if args.uri.len() > METADATA_MAX_URI_LENGTH {
            return Err(MetadataError::FieldTooLong {
                field: "uri",
                max: METADATA_MAX_URI_LENGTH,
            });
        }
        if args.creators.len() > MAX_CREATOR_LIMIT {
            return Err(MetadataError::FieldTooLong {
                field: "creators",
                max: MAX_CREATOR_LIMIT,
            });
        }

        self.records.insert(
            args.mint,
            MetadataRecord {
                mint: args.mint,
                update_authority: args.update_authority,
                name: args.name,
                symbol: args.symbol,
                uri: args.uri,
                seller_fee_basis_points: args.seller_fee_basis_points,
                creators: args.creators,
                collection: Some(CollectionRef {
                    key: args.collection,
                    verified: false,
                }),
                is_mutable: true,
                sizing: CollectionSizing::Unsized,
            },
        );
        Ok(())
    }

    fn create_master_record(
        &mut self,
        mint: &Address,
        authority: &Address,
    ) -> Result<(), MetadataError> {
        if self.masters.contains_key(mint) {
            return Err(MetadataError::MasterRecordAlreadyExists(*mint));
        }
        // Authority check against the metadata record; a master record
        // without metadata is not a thing.
        self.record_mut_checked(mint, authority)?;
        self.masters.insert(
            *mint,
            MasterRecord {
                mint: *mint,
                max_prints: 0,
            },
        );
        Ok(())
    }

    fn verify_collection_item(
        &mut self,
        item_mint: &Address,
        anchor_mint: &Address,
        authority: &Address,
    ) -> Result<(), MetadataError> {
        let anchor = self.record_mut_checked(anchor_mint, authority)?;
        match anchor.sizing {
            CollectionSizing::Unsized => {}
            actual @ CollectionSizing::Sized(_) => {
                return Err(MetadataError::SizingMismatch {
                    actual,
                    required: "Unsized",
                })
            }
        }
        // The unsized path leans entirely on the anchor's fixed supply.
        if !self.masters.contains_key(anchor_mint) {
            return Err(MetadataError::MasterRecordNotFound(*anchor_mint));
        }

        self.mark_item_verified(item_mint, anchor_mint)
    }

    fn verify_sized_collection_item(
        &mut self,
        item_mint: &Address,
        anchor_mint: &Address,
        authority: &Address,
    ) -> Result<(), MetadataError> {
        let anchor = self.record_mut_checked(anchor_mint, authority)?;
        let count = match anchor.sizing {
            CollectionSizing::Sized(count) => count,
            actual @ CollectionSizing::Unsized => {
                return Err(MetadataError::SizingMismatch {
                    actual,
                    required: "Sized",
                })
            }
        };

        self.mark_item_verified(item_mint, anchor_mint)?;

        // Only after the item is actually verified does the count move.
        let anchor = self
            .records
            .get_mut(anchor_mint)
            .expect("anchor checked above");
        anchor.sizing = CollectionSizing::Sized(count.saturating_add(1));
        Ok(())
    }

    fn update_uri(
        &mut self,
        mint: &Address,
        uri: &str,
        authority: &Address,
    ) -> Result<(), MetadataError> {
        if uri.len() > METADATA_MAX_URI_LENGTH {
            return Err(MetadataError::FieldTooLong {
                field: "uri",
                max: METADATA_MAX_URI_LENGTH,
            });
        }
        let record = self.record_mut_checked(mint, authority)?;
        if !record.is_mutable {
            return Err(MetadataError::RecordImmutable(*mint));
        }
        record.uri = uri.to_string();
        Ok(())
    }

    fn update_authority(
        &mut self,
        call: RotationCall,
        mint: &Address,
        new_authority: &Address,
        authority: &Address,
    ) -> Result<(), MetadataError> {
        if !self.rotation_calls.contains(&call) {
            return Err(MetadataError::UnrecognizedCall(call));
        }
        let record = self.record_mut_checked(mint, authority)?;
        record.update_authority = *new_authority;
        Ok(())
    }

    fn record(&self, mint: &Address) -> Option<&MetadataRecord> {
        self.records.get(mint)
    }
}
