use std::{collections::VecDeque, io::{Cursor, Write}, sync::atomic::Ordering};

use flate2::{write::ZlibEncoder, Compression};

use crate::{
    codec::RawDescription,
    AtomHeader,
    AtomPayload,
    AudioTrackStream,
    ChunkCursor,
    ChunkOutcome,
    CodecType,
    EditListEntry,
    Esds,
    FourCC,
    Mdhd,
    ParseOptions,
    PcmBlock,
    PcmRegistry,
    Presentation,
    QtError,
    SampleDescription,
    SampleSize,
    SampleToChunk,
    Stsd,
    SubStream,
    TimeToSample,
    Tkhd,
    Track,
    TrackStatus,
    qt_time,
    qt_time_zero,
};

/// Big endian byte writer for synthetic atoms.
#[derive(Default)]
struct W(Vec<u8>);

impl W {
    fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }
    fn u16(mut self, v: u16) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }
    fn u32(mut self, v: u32) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }
    fn i32(mut self, v: i32) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }
    fn u64(mut self, v: u64) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }
    fn bytes(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }
    fn zeros(mut self, n: usize) -> Self {
        self.0.resize(self.0.len() + n, 0);
        self
    }
    fn matrix(self) -> Self {
        self.u32(0x10000).u32(0).u32(0)
            .u32(0).u32(0x10000).u32(0)
            .u32(0).u32(0).u32(0x4000_0000)
    }
    fn done(self) -> Vec<u8> {
        self.0
    }
}

fn atom(name: &[u8; 4], body: &[u8]) -> Vec<u8> {
    W::default().u32(8 + body.len() as u32).bytes(name).bytes(body).done()
}

fn container(name: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    atom(name, &children.concat())
}

fn mvhd(time_scale: u32, duration: u32) -> Vec<u8> {
    let body = W::default()
        .u32(0).u32(0).u32(0)
        .u32(time_scale).u32(duration)
        .u32(0x10000).u16(0x100).zeros(10)
        .matrix()
        .zeros(7 * 4)
        .done();
    atom(b"mvhd", &body)
}

fn tkhd(id: u32) -> Vec<u8> {
    let body = W::default()
        .u32(0).u32(0).u32(0)
        .u32(id).u32(0).u32(0).zeros(8)
        .u16(0).u16(0).u16(0x100).u16(0)
        .matrix()
        .u32(0).u32(0)
        .done();
    atom(b"tkhd", &body)
}

fn mdhd(time_scale: u32, duration: u32) -> Vec<u8> {
    atom(b"mdhd", &W::default().u32(0).u32(0).u32(0).u32(time_scale).u32(duration).u16(0).u16(0).done())
}

fn hdlr(component_type: &[u8; 4], sub_type: &[u8; 4]) -> Vec<u8> {
    let body = W::default()
        .u32(0).bytes(component_type).bytes(sub_type)
        .zeros(12)
        .u8(5).bytes(b"Sound")
        .done();
    atom(b"hdlr", &body)
}

fn sound_stsd(tag: &[u8; 4], channels: u16, bits: u16, rate: u16) -> Vec<u8> {
    let body = W::default()
        .u32(0).u32(1)
        .u32(36).bytes(tag).zeros(6).u16(1)
        .u16(0).u16(0).u32(0)
        .u16(channels).u16(bits).u16(0).u16(0)
        .u32((rate as u32) << 16)
        .done();
    atom(b"stsd", &body)
}

fn raw_stsd(tag: &[u8; 4]) -> Vec<u8> {
    atom(b"stsd", &W::default().u32(0).u32(1).u32(26).bytes(tag).zeros(6).u16(1).zeros(10).done())
}

fn stts(entries: &[(u32, u32)]) -> Vec<u8> {
    let w = entries.iter().fold(W::default().u32(0).u32(entries.len() as u32), |w, (c, d)| w.u32(*c).u32(*d));
    atom(b"stts", &w.done())
}

fn stsc(entries: &[(u32, u32, u32)]) -> Vec<u8> {
    let w = entries.iter().fold(W::default().u32(0).u32(entries.len() as u32), |w, (f, s, d)| w.u32(*f).u32(*s).u32(*d));
    atom(b"stsc", &w.done())
}

fn stsz_constant(size: u32, count: u32) -> Vec<u8> {
    atom(b"stsz", &W::default().u32(0).u32(size).u32(count).done())
}

fn stsz_sizes(sizes: &[u32]) -> Vec<u8> {
    let w = sizes.iter().fold(W::default().u32(0).u32(0).u32(sizes.len() as u32), |w, s| w.u32(*s));
    atom(b"stsz", &w.done())
}

fn stco(offsets: &[u32]) -> Vec<u8> {
    let w = offsets.iter().fold(W::default().u32(0).u32(offsets.len() as u32), |w, o| w.u32(*o));
    atom(b"stco", &w.done())
}

fn elst(entries: &[(u32, i32, i32)]) -> Vec<u8> {
    let w = entries.iter().fold(W::default().u32(0).u32(entries.len() as u32), |w, (d, t, r)| w.u32(*d).i32(*t).i32(*r));
    atom(b"elst", &w.done())
}

fn trak(id: u32, handler: &[u8; 4], time_scale: u32, edts: Option<Vec<u8>>, stbl: Vec<Vec<u8>>) -> Vec<u8> {
    let mut children = vec![tkhd(id)];
    children.extend(edts.map(|e| container(b"edts", &[e])));
    children.push(container(b"mdia", &[
        mdhd(time_scale, 12),
        hdlr(b"mhlr", handler),
        container(b"minf", &[
            hdlr(b"dhlr", b"alis"),
            container(b"stbl", &stbl),
        ]),
    ]));
    container(b"trak", &children)
}

/// 12 mono 16-bit samples, value = sample index, in 3 chunks of 4 at 8, 16, 24.
fn mdat() -> Vec<u8> {
    let pcm = (0..12_i16).flat_map(|s| s.to_be_bytes()).collect::<Vec<u8>>();
    atom(b"mdat", &pcm)
}

/// Frame-addressed 'twos' track: each stsz sample is one PCM frame.
fn twos_trak(id: u32) -> Vec<u8> {
    trak(id, b"soun", 8000, None, vec![
        sound_stsd(b"twos", 1, 16, 8000),
        stts(&[(12, 1)]),
        stsc(&[(1, 4, 1)]),
        stsz_constant(1, 12),
        stco(&[8, 16, 24]),
    ])
}

fn movie(traks: Vec<Vec<u8>>) -> Vec<u8> {
    let mut moov = vec![mvhd(8000, 12)];
    moov.extend(traks);
    [mdat(), container(b"moov", &moov)].concat()
}

fn parse(file: &[u8]) -> Result<Presentation, QtError> {
    Presentation::parse(&mut Cursor::new(file), &PcmRegistry, &ParseOptions::default())
}

fn samples(queue: &[PcmBlock]) -> Vec<i16> {
    queue.iter().flat_map(|b| b.samples.iter().copied()).collect()
}

/// Two chunks of five 20-byte samples at 1000 and 2000, 100 ticks each.
fn table_track() -> Track {
    let mut track = Track {
        time_scale: 1000,
        codec_type: CodecType::Audio,
        chunk_offsets: vec![1000, 2000],
        sample_to_chunk: vec![SampleToChunk { first_chunk: 1, samples_per_chunk: 5, sample_description_id: 1 }],
        sample_size: SampleSize::PerSample(vec![20; 10]),
        time_to_sample: vec![TimeToSample { count: 10, duration: 100 }],
        sample_descriptions: vec![SampleDescription::Other(RawDescription {
            codec_tag: FourCC(*b"test"),
            data: Vec::new(),
        })],
        ..Track::default()
    };
    track.finalize();
    track
}

#[test]
fn sample_index_lookups() {
    let track = table_track();
    assert!(track.is_usable());
    let index = track.index();

    assert_eq!(index.sample_at_time(250, 1000).unwrap(), 2);
    assert_eq!(index.chunk_for_sample(7).unwrap(), (1, 2));
    assert_eq!(index.byte_offset_and_size(7).unwrap(), (2040, 20));
    assert_eq!(index.chunk_byte_range(1).unwrap(), (2000, 100));
    assert_eq!(index.first_sample_of_chunk(1).unwrap(), 5);
    // past the end
    assert_eq!(index.sample_at_time(5000, 1000).unwrap(), 10);
    assert!(matches!(index.chunk_for_sample(10), Err(QtError::MalformedIndex(_))));
    assert!(matches!(index.sample_at_time(1, 0), Err(QtError::MalformedIndex(_))));
}

#[test]
fn sample_at_time_is_monotonic() {
    let track = table_track();
    let index = track.index();
    let mut last = 0;
    for t in 0..1200 {
        let sample = index.sample_at_time(t, 500).unwrap();
        assert!(sample >= last, "t = {t}");
        last = sample;
    }
}

#[test]
fn samples_lie_within_their_chunk() {
    let track = table_track();
    let index = track.index();
    for sample in 0..track.sample_count() {
        let (chunk, _) = index.chunk_for_sample(sample).unwrap();
        let (start, len) = index.chunk_byte_range(chunk).unwrap();
        let (offset, size) = index.byte_offset_and_size(sample).unwrap();
        assert!(offset >= start && offset + size as u64 <= start + len);
    }
}

#[test]
fn constant_and_per_sample_sizes_agree() {
    let per_sample = table_track();
    let mut constant = table_track();
    constant.sample_size = SampleSize::Constant(20);
    constant.stsz_count = 10;
    constant.finalize();

    for sample in 0..10 {
        assert_eq!(
            per_sample.index().byte_offset_and_size(sample).unwrap(),
            constant.index().byte_offset_and_size(sample).unwrap(),
        );
    }
}

#[test]
fn duplicate_first_chunk_keeps_earlier_entry() {
    let mut track = table_track();
    track.chunk_offsets = vec![0, 100, 200];
    track.sample_size = SampleSize::Constant(1);
    track.sample_to_chunk = vec![
        SampleToChunk { first_chunk: 1, samples_per_chunk: 2, sample_description_id: 1 },
        SampleToChunk { first_chunk: 1, samples_per_chunk: 5, sample_description_id: 1 },
        SampleToChunk { first_chunk: 2, samples_per_chunk: 3, sample_description_id: 1 },
    ];
    track.finalize();
    let index = track.index();

    assert_eq!(index.chunk_for_sample(1).unwrap(), (0, 1));
    assert_eq!(index.chunk_for_sample(2).unwrap(), (1, 0));
    assert_eq!(index.chunk_for_sample(7).unwrap(), (2, 2));
}

#[test]
fn zero_samples_per_chunk_is_malformed() {
    let mut track = table_track();
    track.sample_to_chunk[0].samples_per_chunk = 0;
    assert!(matches!(track.index().chunk_for_sample(0), Err(QtError::MalformedIndex(_))));
    assert!(matches!(track.index().chunk_samples(1), Err(QtError::MalformedIndex(_))));
}

#[test]
fn zero_duration_run_is_malformed() {
    let mut track = table_track();
    track.time_to_sample = vec![TimeToSample { count: 10, duration: 0 }];
    assert!(matches!(track.index().sample_at_time(250, 1000), Err(QtError::MalformedIndex(_))));

    // a trailing zero duration run is only an error once reached
    track.time_to_sample = vec![
        TimeToSample { count: 9, duration: 100 },
        TimeToSample { count: 1, duration: 0 },
    ];
    assert_eq!(track.index().sample_at_time(250, 1000).unwrap(), 2);
    assert!(matches!(track.index().sample_at_time(950, 1000), Err(QtError::MalformedIndex(_))));
}

#[test]
fn seek_with_zero_duration_run_fails() {
    let trak = trak(1, b"soun", 8000, None, vec![
        sound_stsd(b"twos", 1, 16, 8000),
        stts(&[(12, 0)]),
        stsc(&[(1, 4, 1)]),
        stsz_constant(2, 12),
        stco(&[8, 16, 24]),
    ]);
    let file = movie(vec![trak]);
    let movie = parse(&file).unwrap();
    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(file.clone()), &PcmRegistry, &movie);
    consumer.start(&movie.tracks()[0]).unwrap();

    assert!(matches!(consumer.seek(6), Err(QtError::MalformedIndex(_))));
    assert!(!consumer.is_exhausted());
}

#[test]
fn nearest_keyframe() {
    let mut track = table_track();
    assert_eq!(track.index().nearest_keyframe_at_or_before(6), 6);

    track.keyframes = vec![1, 5, 9];
    let index = track.index();
    assert_eq!(index.nearest_keyframe_at_or_before(0), 0);
    assert_eq!(index.nearest_keyframe_at_or_before(3), 0);
    assert_eq!(index.nearest_keyframe_at_or_before(4), 4);
    assert_eq!(index.nearest_keyframe_at_or_before(7), 4);
    assert_eq!(index.nearest_keyframe_at_or_before(100), 8);
    assert!(index.is_keyframe(4));
    assert!(!index.is_keyframe(5));

    track.keyframes = vec![3, 7];
    assert_eq!(track.index().nearest_keyframe_at_or_before(0), 2);
}

#[test]
fn edit_list_maps_presentation_time() {
    let mut track = table_track();
    track.edit_list = vec![
        EditListEntry { track_duration: 250, media_time: -1, media_rate: 0x10000 },
        EditListEntry { track_duration: 500, media_time: 100, media_rate: 0x10000 },
        EditListEntry { track_duration: 100, media_time: 50, media_rate: 0 },
    ];
    track.finalize();
    assert_eq!(track.start_time(), 250);

    // movie time scale 500, track time scale 1000
    assert_eq!(track.media_time_at(100, 500).unwrap(), Some(100));
    assert_eq!(track.media_time_at(350, 500).unwrap(), Some(300));
    assert_eq!(track.media_time_at(780, 500).unwrap(), Some(50));
    assert_eq!(track.media_time_at(850, 500).unwrap(), None);
}

#[test]
fn sample_offsets_expand_chunks() {
    let track = table_track();
    let offsets = track.sample_offsets().unwrap();
    assert_eq!(offsets.len(), 10);
    assert_eq!(offsets[0].position, 1000);
    assert_eq!(offsets[4].position, 1080);
    assert_eq!(offsets[5].position, 2000);
    assert_eq!(offsets[9].size, 20);
    assert_eq!(offsets[3].duration.whole_milliseconds(), 100);
}

#[test]
fn undersized_atom_is_malformed() {
    let data = W::default().u32(4).bytes(b"abcd").zeros(8).done();
    let result = AtomHeader::next_atom(&mut Cursor::new(data.as_slice()), data.len() as u64);
    assert!(matches!(result, Err(QtError::MalformedAtom { size: 4, .. })));

    // same atom at the start of a file
    assert!(matches!(parse(&data), Err(QtError::NotAContainer(_))));
}

#[test]
fn atom_past_parent_is_malformed() {
    let data = W::default().u32(64).bytes(b"free").zeros(8).done();
    let result = AtomHeader::next_atom(&mut Cursor::new(data.as_slice()), data.len() as u64);
    assert!(matches!(result, Err(QtError::MalformedAtom { .. })));
}

#[test]
fn extended_and_zero_sizes() {
    let data = W::default().u32(1).bytes(b"mdat").u64(20).zeros(4)
        .u32(0).bytes(b"free").zeros(12)
        .done();
    let len = data.len() as u64;
    let mut cursor = Cursor::new(data.as_slice());

    let first = AtomHeader::next_atom(&mut cursor, len).unwrap().unwrap();
    assert_eq!(first.header_size(), 16);
    assert_eq!(first.data_size(), 4);

    cursor.set_position(first.end());
    let second = AtomHeader::next_atom(&mut cursor, len).unwrap().unwrap();
    assert_eq!(second.name(), &FourCC::FREE);
    assert_eq!(second.end(), len);

    // zero size with nothing left to extend over ends the container
    let terminator = W::default().u32(0).bytes(b"free").done();
    let result = AtomHeader::next_atom(&mut Cursor::new(terminator.as_slice()), 8);
    assert!(matches!(result, Ok(None)));
}

#[test]
fn parse_sound_movie() {
    let movie = parse(&movie(vec![twos_trak(1)])).unwrap();
    assert_eq!(movie.time_scale(), 8000);
    assert_eq!(movie.duration_ticks(), 12);
    assert_eq!(movie.tracks().len(), 1);

    let track = &movie.tracks()[0];
    assert_eq!(track.id(), 1);
    assert!(track.is_audio());
    assert!(track.is_usable());
    assert!(track.is_frame_addressed());
    assert_eq!(track.name(), "Sound");
    assert_eq!(track.chunk_count(), 3);
    assert_eq!(track.sample_count(), 12);
    assert_eq!(track.chunk_offsets(), &[8, 16, 24]);

    let audio = track.sample_description(1).and_then(|d| d.audio()).unwrap();
    assert_eq!(audio.codec_tag, FourCC(*b"twos"));
    assert_eq!((audio.channels, audio.bits_per_sample, audio.sample_rate_hz()), (1, 16, 8000));
    assert_eq!(movie.audio_tracks().count(), 1);
}

#[test]
fn out_of_range_movie_times() {
    let body = W::default()
        .u32(1 << 24)
        .u64(1 << 62).u64(0)
        .u32(8000).u64(12)
        .u32(0x10000).u16(0x100).zeros(10)
        .matrix()
        .zeros(7 * 4)
        .done();
    let file = [mdat(), container(b"moov", &[atom(b"mvhd", &body), twos_trak(1)])].concat();

    let movie = parse(&file).unwrap();
    assert_eq!(movie.time_scale(), 8000);
    assert_eq!(movie.duration_ticks(), 12);
    assert_eq!(movie.creation_time(), None);
    assert_eq!(movie.modification_time(), Some(qt_time_zero()));
    assert_eq!(qt_time(u64::MAX), None);
}

#[test]
fn header_accessors() {
    let payload = |name: &[u8; 4], body: Vec<u8>| {
        let header = AtomHeader { atom_size: 8 + body.len() as u64, name: FourCC(*name), ..AtomHeader::default() };
        AtomPayload::new(header, body)
    };

    let tkhd = Tkhd::read(&mut payload(b"tkhd", tkhd(7)[8..].to_vec())).unwrap();
    assert_eq!((tkhd.version(), tkhd.track_id(), tkhd.layer(), tkhd.alternate_group()), (0, 7, 0, 0));
    assert_eq!(tkhd.creation_time(), Some(qt_time_zero()));

    let mdhd = Mdhd::read(&mut payload(b"mdhd", mdhd(600, 12)[8..].to_vec())).unwrap();
    assert_eq!((mdhd.version(), mdhd.time_scale(), mdhd.quality()), (0, 600, 0));

    let stsd = Stsd::read(&mut payload(b"stsd", sound_stsd(b"twos", 2, 16, 44100)[8..].to_vec())).unwrap();
    assert_eq!(stsd.entries()[0].data_reference_index(), 1);
    assert_eq!(stsd.entries()[0].codec_tag(), FourCC(*b"twos"));
}

#[test]
fn missing_movie_header() {
    let file = [mdat(), container(b"moov", &[twos_trak(1)])].concat();
    assert!(matches!(parse(&file), Err(QtError::MissingMovieHeader)));
    assert!(matches!(parse(&mdat()), Err(QtError::MissingMovieHeader)));
}

#[test]
fn stream_all_chunks() {
    let file = movie(vec![twos_trak(1)]);
    let movie = parse(&file).unwrap();
    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(file.clone()), &PcmRegistry, &movie);
    consumer.start(&movie.tracks()[0]).unwrap();

    let mut queue = Vec::new();
    assert_eq!(consumer.fill(&mut queue).unwrap(), 3);
    assert_eq!(samples(&queue), (0..12).collect::<Vec<i16>>());
    assert!(consumer.is_exhausted());

    // exhausted calls are no-ops
    assert_eq!(consumer.queue_next_chunk(&mut queue).unwrap(), ChunkOutcome::Exhausted);
    assert_eq!(consumer.queue_next_chunk(&mut queue).unwrap(), ChunkOutcome::Exhausted);
    assert_eq!(queue.len(), 3);
}

#[test]
fn stream_packet_addressed_track() {
    let trak = trak(1, b"soun", 8000, None, vec![
        sound_stsd(b"twos", 1, 16, 8000),
        stts(&[(12, 10)]),
        stsc(&[(1, 4, 1)]),
        stsz_sizes(&[2; 12]),
        stco(&[8, 16, 24]),
    ]);
    let file = movie(vec![trak]);
    let movie = parse(&file).unwrap();
    let track = &movie.tracks()[0];
    assert!(!track.is_frame_addressed());

    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(file.clone()), &PcmRegistry, &movie);
    consumer.start(track).unwrap();
    let mut queue = VecDeque::new();
    consumer.fill(&mut queue).unwrap();
    assert_eq!(queue.iter().flat_map(|b| b.samples.clone()).collect::<Vec<i16>>(), (0..12).collect::<Vec<i16>>());
}

#[test]
fn seek_lands_on_chunk_and_discards() {
    let file = movie(vec![twos_trak(1)]);
    let movie = parse(&file).unwrap();
    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(file.clone()), &PcmRegistry, &movie);
    consumer.start(&movie.tracks()[0]).unwrap();

    let cursor = consumer.seek(6).unwrap();
    assert_eq!(cursor, ChunkCursor { chunk: 1, sample: 4 });
    // idempotent
    assert_eq!(consumer.seek(6).unwrap(), cursor);

    let mut queue = Vec::new();
    let outcome = consumer.queue_next_chunk(&mut queue).unwrap();
    assert_eq!(outcome, ChunkOutcome::Queued { chunk: 1, samples: 4, units: 1 });
    assert_eq!(samples(&queue), vec![6, 7]);
    assert_eq!(consumer.position(), Some(ChunkCursor { chunk: 2, sample: 8 }));
}

#[test]
fn seek_past_end_exhausts() {
    let file = movie(vec![twos_trak(1)]);
    let movie = parse(&file).unwrap();
    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(file.clone()), &PcmRegistry, &movie);
    consumer.start(&movie.tracks()[0]).unwrap();

    consumer.seek(10_000).unwrap();
    assert!(consumer.is_exhausted());
    let mut queue = Vec::new();
    assert_eq!(consumer.queue_next_chunk(&mut queue).unwrap(), ChunkOutcome::Exhausted);
    assert!(queue.is_empty());

    // seeking back resumes
    consumer.seek_time(time::Duration::ZERO).unwrap();
    assert!(!consumer.is_exhausted());
}

#[test]
fn idle_consumer() {
    let file = movie(vec![twos_trak(1)]);
    let mut consumer = AudioTrackStream::new(Cursor::new(file), &PcmRegistry, 8000);
    let mut queue = Vec::new();
    assert!(matches!(consumer.queue_next_chunk(&mut queue), Err(QtError::ConsumerIdle)));
    assert!(matches!(consumer.seek(0), Err(QtError::ConsumerIdle)));
    assert!(!consumer.is_exhausted());
}

#[test]
fn stop_handle_stops_fill() {
    let file = movie(vec![twos_trak(1)]);
    let movie = parse(&file).unwrap();
    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(file.clone()), &PcmRegistry, &movie);
    consumer.start(&movie.tracks()[0]).unwrap();

    consumer.stop_handle().store(true, Ordering::Relaxed);
    let mut queue = Vec::new();
    assert_eq!(consumer.fill(&mut queue).unwrap(), 0);
    assert_eq!(consumer.queue_next_chunk(&mut queue).unwrap(), ChunkOutcome::Stopped);
}

#[test]
fn truncated_stream_returns_to_idle() {
    let file = movie(vec![twos_trak(1)]);
    let movie = parse(&file).unwrap();
    // drop everything after the first chunk
    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(file[..16].to_vec()), &PcmRegistry, &movie);
    consumer.start(&movie.tracks()[0]).unwrap();

    let mut queue = Vec::new();
    assert!(consumer.queue_next_chunk(&mut queue).is_ok());
    assert!(matches!(consumer.queue_next_chunk(&mut queue), Err(QtError::Io(_))));
    assert!(!consumer.is_streaming());
}

#[test]
fn unsupported_codec_is_isolated() {
    let ima4 = trak(1, b"soun", 8000, None, vec![
        sound_stsd(b"ima4", 1, 16, 8000),
        stts(&[(64, 1)]),
        stsc(&[(1, 64, 1)]),
        stsz_constant(1, 64),
        stco(&[8]),
    ]);
    let text = trak(3, b"text", 600, None, vec![
        raw_stsd(b"text"),
        stts(&[(1, 600)]),
        stsc(&[(1, 1, 1)]),
        stsz_sizes(&[4]),
        stco(&[8]),
    ]);
    let movie = parse(&movie(vec![ima4, twos_trak(2), text])).unwrap();

    assert_eq!(movie.tracks().len(), 3);
    assert_eq!(movie.tracks()[0].status(), &TrackStatus::Unsupported(FourCC(*b"ima4")));
    assert_eq!(movie.audio_tracks().map(|t| t.id()).collect::<Vec<_>>(), vec![2]);

    let mut consumer = AudioTrackStream::new(Cursor::new(Vec::new()), &PcmRegistry, 8000);
    assert!(matches!(consumer.start(&movie.tracks()[0]), Err(QtError::TrackUnusable { id: 1, .. })));
    assert!(matches!(consumer.start(&movie.tracks()[2]), Err(QtError::NotAudio(3))));
}

#[test]
fn truncated_table_marks_track_partial() {
    let stco = atom(b"stco", &W::default().u32(0).u32(1000).u32(8).u32(16).done());
    let broken = trak(1, b"soun", 8000, None, vec![
        sound_stsd(b"twos", 1, 16, 8000),
        stts(&[(12, 1)]),
        stsc(&[(1, 4, 1)]),
        stsz_constant(1, 12),
        stco,
    ]);
    let movie = parse(&movie(vec![broken, twos_trak(2)])).unwrap();

    assert!(matches!(movie.tracks()[0].status(), TrackStatus::Partial(_)));
    assert!(movie.tracks()[1].is_usable());
    assert_eq!(movie.usable_tracks().count(), 1);
}

#[test]
fn too_many_tracks() {
    let file = movie(vec![twos_trak(1), twos_trak(2)]);
    let options = ParseOptions::default().with_max_tracks(1);
    let result = Presentation::parse(&mut Cursor::new(file), &PcmRegistry, &options);
    assert!(matches!(result, Err(QtError::TooManyTracks { max: 1 })));
}

#[test]
fn edit_list_offsets_seek() {
    // 4 samples (half a chunk) of empty edit, then the whole media
    let trak = trak(1, b"soun", 8000, Some(elst(&[(4, -1, 0x10000), (12, 0, 0x10000)])), vec![
        sound_stsd(b"twos", 1, 16, 8000),
        stts(&[(12, 1)]),
        stsc(&[(1, 4, 1)]),
        stsz_constant(1, 12),
        stco(&[8, 16, 24]),
    ]);
    let file = movie(vec![trak]);
    let movie = parse(&file).unwrap();
    let track = &movie.tracks()[0];
    assert_eq!(track.start_time(), 4);

    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(file.clone()), &PcmRegistry, &movie);
    consumer.start(track).unwrap();
    assert_eq!(consumer.seek(2).unwrap(), ChunkCursor { chunk: 0, sample: 0 });
    assert_eq!(consumer.seek(9).unwrap(), ChunkCursor { chunk: 1, sample: 4 });
}

#[test]
fn compressed_movie() {
    let moov = container(b"moov", &[mvhd(8000, 12), twos_trak(1)]);
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&moov).unwrap();
    let compressed = encoder.finish().unwrap();

    let cmov = container(b"cmov", &[
        atom(b"dcom", b"zlib"),
        atom(b"cmvd", &W::default().u32(moov.len() as u32).bytes(&compressed).done()),
    ]);
    let file = [mdat(), container(b"moov", &[cmov])].concat();

    let movie = parse(&file).unwrap();
    assert_eq!(movie.time_scale(), 8000);
    assert_eq!(movie.audio_tracks().count(), 1);
}

#[test]
fn embedded_movie() {
    let file = movie(vec![twos_trak(1)]);
    let outer = [vec![0xff_u8; 50], file.clone(), vec![0xff; 10]].concat();

    // chunk offsets are relative to the sub stream
    let mut sub = SubStream::new(Cursor::new(outer.clone()), 50, file.len() as u64).unwrap();
    let movie = Presentation::parse(&mut sub, &PcmRegistry, &ParseOptions::default()).unwrap();
    let mut consumer = AudioTrackStream::for_presentation(sub, &PcmRegistry, &movie);
    consumer.start(&movie.tracks()[0]).unwrap();
    let mut queue = Vec::new();
    consumer.fill(&mut queue).unwrap();
    assert_eq!(samples(&queue), (0..12).collect::<Vec<i16>>());

    // or absolute, by rebasing
    let mut movie = movie.clone();
    movie.rebase(50);
    assert_eq!(movie.tracks()[0].chunk_offsets(), &[58, 66, 74]);
    let mut consumer = AudioTrackStream::for_presentation(Cursor::new(outer), &PcmRegistry, &movie);
    consumer.start(&movie.tracks()[0]).unwrap();
    let mut queue = Vec::new();
    consumer.fill(&mut queue).unwrap();
    assert_eq!(samples(&queue), (0..12).collect::<Vec<i16>>());
}

#[test]
fn begin_offset_shifts_chunks() {
    let file = movie(vec![twos_trak(1)]);
    let options = ParseOptions::default().with_begin_offset(100);
    let movie = Presentation::parse(&mut Cursor::new(file), &PcmRegistry, &options).unwrap();
    assert_eq!(movie.begin_offset(), 100);
    assert_eq!(movie.tracks()[0].chunk_offsets(), &[108, 116, 124]);
}

#[test]
fn esds_inside_wave() {
    let esds_body = W::default()
        .u32(0)
        // ES descriptor
        .u8(0x03).u8(22).u16(1).u8(0)
        // decoder config, holding the decoder specific info
        .u8(0x04).u8(17).u8(0x40).u8(0x15).bytes(&[0, 0, 0]).u32(128_000).u32(96_000)
        .u8(0x05).u8(2).bytes(&[0x12, 0x10])
        .done();
    let wave = container(b"wave", &[atom(b"frma", b"mp4a"), atom(b"esds", &esds_body)]);

    let esds = Esds::find(&wave).unwrap();
    assert_eq!(esds.object_type_id, 0x40);
    assert_eq!(esds.stream_type, 5);
    assert_eq!(esds.avg_bitrate, 96_000);
    assert_eq!(esds.decoder_specific_info, vec![0x12, 0x10]);
}
