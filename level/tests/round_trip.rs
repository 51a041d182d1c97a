use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilestep_core::{
    CollisionShape, EnemySpawn, EnemyTypeId, LevelData, SpawnPoint, TileGrid, TileKind,
};
use tilestep_level::{self as level, LevelCodecError};

const FIXTURE_SEED: u64 = 0x7d3a_91c4_0b5e_2f68;

fn random_level(rng: &mut ChaCha8Rng) -> LevelData {
    let columns = rng.gen_range(1..48);
    let rows = rng.gen_range(1..32);
    let mut grid = TileGrid::new(columns, rows, 32);

    for _ in 0..rng.gen_range(0..200) {
        let column = rng.gen_range(0..columns) as i32;
        let row = rng.gen_range(0..rows) as i32;
        let kind = match rng.gen_range(0..3) {
            0 => TileKind::Solid,
            1 => TileKind::Platform,
            _ => TileKind::Empty,
        };
        grid.set(column, row, kind);
        let shape = CollisionShape::ALL[rng.gen_range(0..CollisionShape::ALL.len())];
        grid.set_shape(column, row, shape);
    }

    let player_spawn = rng
        .gen_bool(0.7)
        .then(|| SpawnPoint::new(rng.gen_range(0..columns as i32), rng.gen_range(0..rows as i32)));
    let enemy_spawns = (0..rng.gen_range(0..6))
        .map(|_| EnemySpawn {
            at: SpawnPoint::new(rng.gen_range(0..columns as i32), rng.gen_range(0..rows as i32)),
            enemy_type: EnemyTypeId::new(rng.gen()),
        })
        .collect();

    LevelData::from_grid(&grid, player_spawn, enemy_spawns)
}

#[test]
fn seeded_random_levels_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(FIXTURE_SEED);
    for _ in 0..64 {
        let original = random_level(&mut rng);
        let bytes = level::encode(&original).expect("level encodes");
        let restored = level::decode(&bytes).expect("level decodes");

        assert_eq!(restored, original);
        assert_eq!(restored.to_grid(), original.to_grid());
    }
}

#[test]
fn resaving_a_loaded_file_is_byte_identical() {
    let mut rng = ChaCha8Rng::seed_from_u64(FIXTURE_SEED ^ 1);
    let original = random_level(&mut rng);
    let first = level::encode(&original).expect("level encodes");
    let reloaded = level::decode(&first).expect("level decodes");
    let second = level::encode(&reloaded).expect("level re-encodes");

    assert_eq!(first, second);
}

#[test]
fn files_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("stage.tmap");
    let mut rng = ChaCha8Rng::seed_from_u64(FIXTURE_SEED ^ 2);
    let original = random_level(&mut rng);

    level::save_file(&path, &original).expect("level saves");
    let restored = level::load_file(&path).expect("level loads");

    assert_eq!(restored, original);
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let error = level::load_file(dir.path().join("absent.tmap")).expect_err("file is missing");
    assert!(matches!(error, LevelCodecError::Io(_)));
}

proptest! {
    #[test]
    fn sparse_grids_round_trip(
        columns in 1u32..24,
        rows in 1u32..24,
        tiles in prop::collection::vec((0u32..24, 0u32..24, 0u8..3, 0u8..9), 0..80),
        spawn in prop::option::of((0i32..24, 0i32..24)),
        enemies in prop::collection::vec((0i32..24, 0i32..24, any::<u8>()), 0..8),
    ) {
        let mut grid = TileGrid::new(columns, rows, 24);
        for (x, y, kind, shape) in tiles {
            let kind = TileKind::from_byte(kind).expect("kind byte in range");
            let shape = CollisionShape::from_byte(shape).expect("shape byte in range");
            grid.set_cell(x as i32, y as i32, kind, shape);
        }
        let enemy_spawns = enemies
            .into_iter()
            .map(|(x, y, kind)| EnemySpawn { at: SpawnPoint::new(x, y), enemy_type: EnemyTypeId::new(kind) })
            .collect();
        let player_spawn = spawn.map(|(x, y)| SpawnPoint::new(x, y));
        let original = LevelData::from_grid(&grid, player_spawn, enemy_spawns);

        let bytes = level::encode(&original).expect("level encodes");
        let restored = level::decode(&bytes).expect("level decodes");

        prop_assert_eq!(restored.to_grid(), grid);
        prop_assert_eq!(restored, original);
    }
}
