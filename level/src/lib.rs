#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Binary persistence for Tilestep levels.
//!
//! Levels are stored in the little-endian `TMAP` format:
//!
//! ```text
//! magic "TMAP" | version u16 | tile edge u16 | width u32 | height u32
//! tile count u32, then per tile: x u16, y u16, kind u8, shape u8 (v2 only)
//! player spawn x i32, y i32 (-1 = unset)
//! enemy count u32, then per enemy: x i32, y i32, type u8
//! ```
//!
//! Both versions are readable; version 1 files carry no shape byte and have
//! their shapes inferred from the tile kind. Writing always produces the
//! current version. Decoding fills a fresh [`LevelData`] and only hands it
//! back once every field parsed, so callers can swap it in atomically.

mod bytes;

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use tilestep_core::{
    CollisionShape, EnemySpawn, EnemyTypeId, LevelData, SpawnPoint, TileCell, TileKind,
    TileRecord,
};
use tracing::warn;

use crate::bytes::{put_i32, put_u16, put_u32, put_u8, ByteReader};

/// Four-byte tag opening every level file.
pub const MAGIC: [u8; 4] = *b"TMAP";
/// Legacy format without per-tile collision shapes.
pub const LEGACY_VERSION: u16 = 1;
/// Format written by [`encode`].
pub const CURRENT_VERSION: u16 = 2;
/// Widest or tallest level whose every tile a 16-bit record can address.
pub const MAX_DIMENSION: u32 = 1 << 16;
/// Largest number of cells a level may declare.
pub const MAX_CELLS: u64 = 1 << 22;

const UNSET_SPAWN: i32 = -1;
const LEGACY_TILE_RECORD_LEN: usize = 5;
const TILE_RECORD_LEN: usize = 6;
const ENEMY_RECORD_LEN: usize = 9;

/// Failures raised while reading or writing level data.
#[derive(Debug, thiserror::Error)]
pub enum LevelCodecError {
    /// The data does not start with the `TMAP` tag.
    #[error("not a level file: expected magic \"TMAP\", found {found:?}")]
    BadMagic {
        /// First four bytes that were read instead.
        found: [u8; 4],
    },

    /// The version field names a revision this reader does not know.
    #[error("unsupported level version {0}")]
    UnsupportedVersion(u16),

    /// The data ended before a field could be read.
    #[error("level data ended while reading {field}")]
    Truncated {
        /// Name of the field that was cut short.
        field: &'static str,
    },

    /// A tile record carries an unknown kind byte.
    #[error("tile ({x}, {y}) has unknown kind byte {byte}")]
    UnknownTileKind {
        /// Column of the offending record.
        x: u16,
        /// Row of the offending record.
        y: u16,
        /// Byte that failed to parse.
        byte: u8,
    },

    /// A tile record carries an unknown collision shape byte.
    #[error("tile ({x}, {y}) has unknown collision shape byte {byte}")]
    UnknownCollisionShape {
        /// Column of the offending record.
        x: u16,
        /// Row of the offending record.
        y: u16,
        /// Byte that failed to parse.
        byte: u8,
    },

    /// The header declares a zero tile edge.
    #[error("tile edge must be positive")]
    ZeroTileEdge,

    /// The header declares more columns, rows or cells than a level may hold.
    #[error("level dimensions {columns}x{rows} exceed the supported size")]
    DimensionsTooLarge {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
    },

    /// A record list is too long for its 32-bit count prefix.
    #[error("too many {field} to encode")]
    TooManyRecords {
        /// Name of the list that overflowed.
        field: &'static str,
    },

    /// Reading from or writing to the underlying stream failed.
    #[error("level I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed-size prefix of a level file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelHeader {
    /// Format revision of the file.
    pub version: u16,
    /// Length of a tile edge in world units.
    pub tile_edge: u16,
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
}

/// Parses only the header, validating magic and version.
pub fn read_header(bytes: &[u8]) -> Result<LevelHeader, LevelCodecError> {
    header(&mut ByteReader::new(bytes))
}

/// Decodes a complete level from an in-memory buffer.
///
/// Tile records outside the declared dimensions and records of the empty
/// kind are skipped. Trailing bytes after the enemy list are ignored.
pub fn decode(bytes: &[u8]) -> Result<LevelData, LevelCodecError> {
    let mut reader = ByteReader::new(bytes);
    let header = header(&mut reader)?;

    let tile_count = reader.u32("tile count")? as usize;
    let record_len = if header.version == LEGACY_VERSION {
        LEGACY_TILE_RECORD_LEN
    } else {
        TILE_RECORD_LEN
    };
    let mut tiles = Vec::with_capacity(tile_count.min(reader.remaining() / record_len));
    for _ in 0..tile_count {
        if let Some(tile) = tile_record(&mut reader, &header)? {
            tiles.push(tile);
        }
    }

    let spawn_x = reader.i32("player spawn x")?;
    let spawn_y = reader.i32("player spawn y")?;
    let player_spawn = (spawn_x >= 0 && spawn_y >= 0).then(|| SpawnPoint::new(spawn_x, spawn_y));

    let enemy_count = reader.u32("enemy count")? as usize;
    let mut enemy_spawns = Vec::with_capacity(enemy_count.min(reader.remaining() / ENEMY_RECORD_LEN));
    for _ in 0..enemy_count {
        let x = reader.i32("enemy x")?;
        let y = reader.i32("enemy y")?;
        let enemy_type = EnemyTypeId::new(reader.u8("enemy type")?);
        enemy_spawns.push(EnemySpawn {
            at: SpawnPoint::new(x, y),
            enemy_type,
        });
    }

    Ok(LevelData {
        tile_edge: header.tile_edge,
        columns: header.columns,
        rows: header.rows,
        tiles,
        player_spawn,
        enemy_spawns,
    })
}

/// Encodes a level in the current format.
///
/// Levels that [`decode`] would reject for their tile edge or dimensions are
/// refused here too.
pub fn encode(level: &LevelData) -> Result<Vec<u8>, LevelCodecError> {
    check_dimensions(level.tile_edge, level.columns, level.rows)?;
    let tile_count = count_prefix(level.tiles.len(), "tiles")?;
    let enemy_count = count_prefix(level.enemy_spawns.len(), "enemy spawns")?;

    let mut out = Vec::with_capacity(
        16 + 4
            + level.tiles.len() * TILE_RECORD_LEN
            + 12
            + level.enemy_spawns.len() * ENEMY_RECORD_LEN,
    );
    out.extend_from_slice(&MAGIC);
    put_u16(&mut out, CURRENT_VERSION);
    put_u16(&mut out, level.tile_edge);
    put_u32(&mut out, level.columns);
    put_u32(&mut out, level.rows);

    put_u32(&mut out, tile_count);
    for tile in &level.tiles {
        put_u16(&mut out, tile.x);
        put_u16(&mut out, tile.y);
        put_u8(&mut out, tile.kind.to_byte());
        put_u8(&mut out, tile.shape.to_byte());
    }

    let (spawn_x, spawn_y) = level
        .player_spawn
        .map_or((UNSET_SPAWN, UNSET_SPAWN), |spawn| (spawn.x, spawn.y));
    put_i32(&mut out, spawn_x);
    put_i32(&mut out, spawn_y);

    put_u32(&mut out, enemy_count);
    for enemy in &level.enemy_spawns {
        put_i32(&mut out, enemy.at.x);
        put_i32(&mut out, enemy.at.y);
        put_u8(&mut out, enemy.enemy_type.get());
    }

    Ok(out)
}

/// Reads and decodes a level from a stream.
pub fn read_from<R: Read>(mut reader: R) -> Result<LevelData, LevelCodecError> {
    let mut bytes = Vec::new();
    let _ = reader.read_to_end(&mut bytes)?;
    decode(&bytes)
}

/// Encodes a level and writes it to a stream.
pub fn write_to<W: Write>(level: &LevelData, mut writer: W) -> Result<(), LevelCodecError> {
    let bytes = encode(level)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Loads a level file from disk.
pub fn load_file(path: impl AsRef<Path>) -> Result<LevelData, LevelCodecError> {
    let file = File::open(path.as_ref())?;
    read_from(BufReader::new(file))
}

/// Saves a level to disk in the current format.
///
/// The level is encoded before the file is created, so an encoding failure
/// never truncates an existing file.
pub fn save_file(path: impl AsRef<Path>, level: &LevelData) -> Result<(), LevelCodecError> {
    let bytes = encode(level)?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn header(reader: &mut ByteReader<'_>) -> Result<LevelHeader, LevelCodecError> {
    let found = reader.array::<4>("magic")?;
    if found != MAGIC {
        return Err(LevelCodecError::BadMagic { found });
    }

    let version = reader.u16("version")?;
    if version != LEGACY_VERSION && version != CURRENT_VERSION {
        return Err(LevelCodecError::UnsupportedVersion(version));
    }

    let header = LevelHeader {
        version,
        tile_edge: reader.u16("tile edge")?,
        columns: reader.u32("width")?,
        rows: reader.u32("height")?,
    };
    check_dimensions(header.tile_edge, header.columns, header.rows)?;
    Ok(header)
}

fn check_dimensions(tile_edge: u16, columns: u32, rows: u32) -> Result<(), LevelCodecError> {
    if tile_edge == 0 {
        return Err(LevelCodecError::ZeroTileEdge);
    }
    let cells = u64::from(columns) * u64::from(rows);
    if columns > MAX_DIMENSION || rows > MAX_DIMENSION || cells > MAX_CELLS {
        return Err(LevelCodecError::DimensionsTooLarge { columns, rows });
    }
    Ok(())
}

fn tile_record(
    reader: &mut ByteReader<'_>,
    header: &LevelHeader,
) -> Result<Option<TileRecord>, LevelCodecError> {
    let x = reader.u16("tile x")?;
    let y = reader.u16("tile y")?;
    let kind_byte = reader.u8("tile kind")?;
    let kind = TileKind::from_byte(kind_byte).ok_or(LevelCodecError::UnknownTileKind {
        x,
        y,
        byte: kind_byte,
    })?;

    let shape = if header.version == LEGACY_VERSION {
        kind.default_shape()
    } else {
        let shape_byte = reader.u8("tile shape")?;
        CollisionShape::from_byte(shape_byte).ok_or(LevelCodecError::UnknownCollisionShape {
            x,
            y,
            byte: shape_byte,
        })?
    };

    if u32::from(x) >= header.columns || u32::from(y) >= header.rows {
        warn!(
            x,
            y,
            columns = header.columns,
            rows = header.rows,
            "skipping tile outside level bounds"
        );
        return Ok(None);
    }
    if kind == TileKind::Empty {
        warn!(x, y, "skipping empty tile record");
        return Ok(None);
    }

    let cell = TileCell::normalized(kind, shape);
    Ok(Some(TileRecord {
        x,
        y,
        kind: cell.kind(),
        shape: cell.shape(),
    }))
}

fn count_prefix(len: usize, field: &'static str) -> Result<u32, LevelCodecError> {
    u32::try_from(len).map_err(|_| LevelCodecError::TooManyRecords { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_file(tiles: &[(u16, u16, u8)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"TMAP");
        put_u16(&mut out, LEGACY_VERSION);
        put_u16(&mut out, 32);
        put_u32(&mut out, 8);
        put_u32(&mut out, 8);
        put_u32(&mut out, tiles.len() as u32);
        for (x, y, kind) in tiles {
            put_u16(&mut out, *x);
            put_u16(&mut out, *y);
            put_u8(&mut out, *kind);
        }
        put_i32(&mut out, -1);
        put_i32(&mut out, -1);
        put_u32(&mut out, 0);
        out
    }

    #[test]
    fn legacy_platform_tiles_get_platform_shape() {
        let level = decode(&legacy_file(&[(2, 2, 2)])).expect("legacy file decodes");
        let grid = level.to_grid();
        assert_eq!(grid.get(2, 2).kind(), TileKind::Platform);
        assert_eq!(grid.get(2, 2).shape(), CollisionShape::Platform);
    }

    #[test]
    fn legacy_solid_tiles_get_full_shape() {
        let level = decode(&legacy_file(&[(1, 3, 1), (4, 4, 1)])).expect("legacy file decodes");
        assert!(level
            .tiles
            .iter()
            .all(|tile| tile.shape == CollisionShape::Full));
        assert_eq!(level.player_spawn, None);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = legacy_file(&[]);
        bytes[0] = b'X';
        let error = decode(&bytes).expect_err("magic mismatch");
        assert!(matches!(error, LevelCodecError::BadMagic { .. }));
    }

    #[test]
    fn unknown_versions_are_rejected() {
        for version in [0u16, 3, 0xffff] {
            let mut bytes = legacy_file(&[]);
            bytes[4..6].copy_from_slice(&version.to_le_bytes());
            let error = decode(&bytes).expect_err("version should be rejected");
            assert!(
                matches!(error, LevelCodecError::UnsupportedVersion(found) if found == version),
                "unexpected error for version {version}: {error}"
            );
        }
    }

    #[test]
    fn truncated_tile_list_fails_cleanly() {
        let mut bytes = legacy_file(&[(1, 1, 1), (2, 2, 1)]);
        bytes.truncate(16 + 4 + 7);
        let error = decode(&bytes).expect_err("file is cut short");
        assert!(matches!(error, LevelCodecError::Truncated { field: "tile y" }));
    }

    #[test]
    fn huge_declared_counts_do_not_allocate_up_front() {
        let mut bytes = legacy_file(&[]);
        bytes[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes.truncate(20);
        let error = decode(&bytes).expect_err("count exceeds data");
        assert!(matches!(error, LevelCodecError::Truncated { .. }));
    }

    #[test]
    fn zero_tile_edge_is_rejected() {
        let mut bytes = legacy_file(&[(1, 1, 1)]);
        bytes[6..8].copy_from_slice(&0u16.to_le_bytes());

        assert!(matches!(
            read_header(&bytes),
            Err(LevelCodecError::ZeroTileEdge)
        ));
        assert!(matches!(decode(&bytes), Err(LevelCodecError::ZeroTileEdge)));
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_any_grid_exists() {
        let declared = [
            (u32::MAX, u32::MAX),
            (MAX_DIMENSION + 1, 1),
            (1, MAX_DIMENSION + 1),
            (4096, 4096),
        ];
        for (columns, rows) in declared {
            let mut bytes = legacy_file(&[]);
            bytes[8..12].copy_from_slice(&columns.to_le_bytes());
            bytes[12..16].copy_from_slice(&rows.to_le_bytes());

            let error = decode(&bytes).expect_err("dimensions are too large");
            assert!(
                matches!(
                    error,
                    LevelCodecError::DimensionsTooLarge { columns: c, rows: r }
                        if c == columns && r == rows
                ),
                "unexpected error for {columns}x{rows}: {error}"
            );
        }
    }

    #[test]
    fn widest_addressable_strip_is_accepted() {
        let mut bytes = legacy_file(&[]);
        bytes[8..12].copy_from_slice(&MAX_DIMENSION.to_le_bytes());
        bytes[12..16].copy_from_slice(&1u32.to_le_bytes());

        let level = decode(&bytes).expect("a single row of 65536 tiles fits");
        assert_eq!(level.columns, MAX_DIMENSION);
    }

    #[test]
    fn encoder_refuses_levels_it_could_not_read_back() {
        let level = LevelData {
            tile_edge: 0,
            columns: 3,
            rows: 2,
            tiles: Vec::new(),
            player_spawn: None,
            enemy_spawns: Vec::new(),
        };
        assert!(matches!(encode(&level), Err(LevelCodecError::ZeroTileEdge)));
    }

    #[test]
    fn out_of_range_and_empty_records_are_skipped() {
        let level = decode(&legacy_file(&[(8, 0, 1), (0, 9, 2), (3, 3, 0), (1, 1, 1)]))
            .expect("file decodes");
        assert_eq!(
            level.tiles,
            vec![TileRecord {
                x: 1,
                y: 1,
                kind: TileKind::Solid,
                shape: CollisionShape::Full,
            }]
        );
    }

    #[test]
    fn unknown_tile_kind_is_reported() {
        let error = decode(&legacy_file(&[(1, 1, 7)])).expect_err("kind byte 7 is unknown");
        assert!(matches!(
            error,
            LevelCodecError::UnknownTileKind { x: 1, y: 1, byte: 7 }
        ));
    }

    #[test]
    fn writer_emits_current_version_and_unset_spawn_sentinel() {
        let level = LevelData {
            tile_edge: 16,
            columns: 3,
            rows: 2,
            tiles: Vec::new(),
            player_spawn: None,
            enemy_spawns: Vec::new(),
        };
        let bytes = encode(&level).expect("level encodes");

        assert_eq!(&bytes[0..4], b"TMAP");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), CURRENT_VERSION);
        assert_eq!(&bytes[20..24], &(-1i32).to_le_bytes());
        assert_eq!(&bytes[24..28], &(-1i32).to_le_bytes());
        assert_eq!(bytes.len(), 32);

        let header = read_header(&bytes).expect("header parses");
        assert_eq!(
            header,
            LevelHeader {
                version: CURRENT_VERSION,
                tile_edge: 16,
                columns: 3,
                rows: 2,
            }
        );
    }
}
