//! Property-based tests for the compression codec and the containers built on top of it
//!
//! ```bash
//! cargo test -p lsdj --test roundtrip
//! ```

use lsdj::{
    fs::File,
    lsdsng::{LsdSng, is_likely_valid_lsdsng},
    name::Name,
    project::Project,
    serde::{DecompressError, compress, decompress},
    song::{
        SongMemory,
        instrument::{InstrumentKind, InstrumentVariant},
        wave::DEFAULT_WAVE,
    },
    sram::{SRam, is_likely_valid_sav},
    u4, u5, u6,
};
use proptest::prelude::*;
use std::str::FromStr;

// ============================================================================
// Strategies
// ============================================================================

/// A piece of song memory, biased towards the things the compressor treats specially
fn segment() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        4 => (any::<u8>(), 1..600usize).prop_map(|(byte, count)| vec![byte; count]),
        2 => (prop::sample::select(vec![0xC0_u8, 0xE0, 0xF0, 0xF1, 0xFF]), 1..4usize)
            .prop_map(|(byte, count)| vec![byte; count]),
        1 => (1..20usize).prop_map(|count| DEFAULT_WAVE.repeat(count)),
        2 => prop::collection::vec(any::<u8>(), 1..64),
    ]
}

/// Exactly one song's worth of bytes
fn song_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(segment(), 1..200).prop_map(|segments| {
        let mut bytes = segments.concat();
        bytes.resize(SongMemory::LEN, 0);
        bytes
    })
}

/// A factory song with a few settings changed, so that a handful fit in one filesystem
fn project() -> impl Strategy<Value = Project> {
    ("[A-Z0-9 ]{0,8}", any::<u8>(), any::<u8>(), 40..=295u16).prop_map(
        |(name, version, tune, tempo)| {
            let mut project = Project::new();
            project.name = Name::from_str(&name).unwrap();
            project.version = version;

            let mut settings = project.song.settings_mut();
            settings.set_tune(tune);
            settings.set_tempo(tempo).unwrap();

            project
        },
    )
}

fn sram() -> impl Strategy<Value = SRam> {
    (
        prop::collection::btree_map(0..32u8, project(), 0..8),
        prop::option::of(0..32u8),
    )
        .prop_map(|(projects, active)| {
            let mut sram = SRam::new();
            for (index, project) in projects {
                sram.set_project(u5::new(index), project);
            }
            sram.set_active_project(active.map(u5::new));
            sram
        })
}

// ============================================================================
// Compression
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every song survives compression and decompression unchanged
    #[test]
    fn compression_roundtrip(bytes in song_bytes()) {
        let compressed = compress(&bytes, LsdSng::MAX_BLOCKS).unwrap();
        prop_assert_eq!(compressed.len() % 0x200, 0);

        let decompressed = decompress(&compressed).unwrap();
        prop_assert_eq!(decompressed.as_slice(), bytes.as_slice());
    }

    /// Cutting a compressed stream off anywhere before its end-of-file command never panics
    #[test]
    fn truncation(bytes in song_bytes(), cut in any::<prop::sample::Index>()) {
        let compressed = compress(&bytes, LsdSng::MAX_BLOCKS).unwrap();
        let eof = compressed
            .windows(2)
            .rposition(|window| window == [0xE0_u8, 0xFF])
            .unwrap();

        let len = cut.index(eof + 2);
        prop_assert!(matches!(
            decompress(&compressed[..len]),
            Err(DecompressError::TruncatedStream)
        ));
    }

    /// The validators only answer, whatever they're fed
    #[test]
    fn validators_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..0x2000)) {
        let _ = is_likely_valid_lsdsng(&bytes);
        let _ = is_likely_valid_sav(&bytes);
        let _ = SongMemory::is_likely_valid(&bytes);
        let _ = decompress(&bytes);
    }
}

/// Every single prefix of a compressed song, up to and excluding its end-of-file command
#[test]
fn truncation_every_prefix() {
    let mut song = SongMemory::new();
    song.settings_mut().set_tempo(133).unwrap();
    for (index, byte) in song.as_mut_slice()[0x6000..0x7000].iter_mut().enumerate() {
        *byte = (index * 7 % 251) as u8;
    }

    let compressed = compress(song.as_slice(), LsdSng::MAX_BLOCKS).unwrap();
    let eof = compressed
        .windows(2)
        .rposition(|window| window == [0xE0_u8, 0xFF])
        .unwrap();

    for len in 0..eof + 2 {
        assert!(
            matches!(
                decompress(&compressed[..len]),
                Err(DecompressError::TruncatedStream)
            ),
            "prefix of {len} bytes"
        );
    }

    let decompressed = decompress(&compressed[..eof + 2]).unwrap();
    assert_eq!(decompressed.as_slice(), song.as_slice());
}

// ============================================================================
// Containers
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Writing what was read produces the same bytes and the same observable state
    #[test]
    fn sav_reserialization(sram in sram()) {
        let bytes = sram.to_bytes().unwrap();
        prop_assert!(is_likely_valid_sav(&bytes));

        let read = SRam::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&read, &sram);
        prop_assert_eq!(read.to_bytes().unwrap(), bytes);
    }

    /// Erasing a project leaves every other slot alone, also after a round trip
    #[test]
    fn slot_isolation(mut sram in sram(), erase in 0..32u8) {
        let before = sram.clone();
        sram.erase_project(u5::new(erase));

        let read = SRam::from_bytes(&sram.to_bytes().unwrap()).unwrap();

        for index in (0..32).map(u5::new) {
            if index == u5::new(erase) {
                prop_assert!(read.project(index).is_none());
            } else {
                prop_assert_eq!(read.project(index), before.project(index));
            }
        }

        prop_assert_eq!(read.active_project(), before.active_project());
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn happy_bd() -> anyhow::Result<()> {
    let mut project = Project::new();
    project.name = Name::from_str("HAPPY BD")?;
    project.version = 4;
    project.song.settings_mut().set_tempo(170)?;

    let mut lsdsng = Vec::new();
    project.to_writer(&mut lsdsng)?;
    assert!(is_likely_valid_lsdsng(&lsdsng));

    let mut sram = SRam::new();
    sram.set_project(u5::new(3), Project::from_reader(lsdsng.as_slice())?);
    let sav = sram.to_bytes()?;

    let from_lsdsng = Project::from_reader(lsdsng.as_slice())?;
    let sram = SRam::from_bytes(&sav)?;
    let from_sav = sram.project(u5::new(3)).unwrap();

    assert_eq!(from_lsdsng.name.as_str(), "HAPPY BD");
    assert_eq!(from_lsdsng.version, 4);
    assert_eq!(from_sav.name, from_lsdsng.name);
    assert_eq!(from_sav.version, 4);
    assert_eq!(from_sav.song.as_slice(), from_lsdsng.song.as_slice());
    assert_eq!(from_sav.song.settings().tempo(), 170);

    // Exporting the slot again gives the same .lsdsng
    assert_eq!(from_sav.lsdsng()?, LsdSng::from_bytes(&lsdsng)?);

    Ok(())
}

#[test]
fn sentinels() {
    let sram = SRam::new();
    assert_eq!(sram.active_project(), None);

    let project = Project::new();
    assert_eq!(project.name.len(), 0);
    assert_eq!(project.version, 0);
}

#[test]
fn wave_length_gated_on_version() {
    const RECORD: usize = 0x3080;

    let mut song = SongMemory::new();
    song.instrument_mut(u6::new(0)).set_kind(InstrumentKind::Wave);
    song.as_mut_slice()[RECORD + 10] = 0x03;

    let length = |song: &SongMemory| match song.instrument(u6::new(0)).variant() {
        Some(InstrumentVariant::Wave(wave)) => wave.length(),
        _ => panic!("instrument 0 should be a wave instrument"),
    };

    song.set_format_version(7);
    assert_eq!(length(&song), u4::new(0xC));

    song.set_format_version(6);
    assert_eq!(length(&song), u4::new(0x3));
}
