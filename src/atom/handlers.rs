//! Leaf atom handlers. Each reads its atom type and
//! stores the result in the movie or in the current track.

use crate::{
    atom_types::{Cmov, Co64, Elst, Hdlr, Mdhd, Mvhd, Stco, Stsc, Stsd, Stss, Stsz, Stts, Tkhd},
    codec::{RawDescription, SampleDescription},
    CodecType,
    QtError,
    TrackStatus,
};

use super::{AtomPayload, LeafOutcome, ParseEnv, Scope};

macro_rules! in_track {
    ($scope:expr, $payload:expr) => {
        match $scope.track() {
            Some(track) => track,
            None => {
                log::debug!("Ignoring '{}' outside of a track", $payload.header().name());
                return Ok(LeafOutcome::Done)
            },
        }
    };
}

pub(crate) fn mvhd(env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    if let Scope::Track(_) = scope {
        log::debug!("Ignoring 'mvhd' inside a track");
        return Ok(LeafOutcome::Done)
    }
    let mvhd = Mvhd::read(payload)?;
    let movie = &mut *env.presentation;
    movie.time_scale = mvhd.time_scale;
    movie.duration = mvhd.duration;
    movie.creation_time = mvhd.creation_time;
    movie.modification_time = mvhd.modification_time;
    movie.preferred_rate = mvhd.preferred_rate();
    movie.x_scale = mvhd.matrix.x_scale();
    movie.y_scale = mvhd.matrix.y_scale();
    movie.has_movie_header = true;
    log::debug!("mvhd: time scale {}, duration {}", mvhd.time_scale, mvhd.duration);
    Ok(LeafOutcome::Done)
}

pub(crate) fn cmov(env: &mut ParseEnv<'_>, _scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let cmov = Cmov::read(payload)?;
    let expanded = cmov.expand(env.options.max_leaf_size)?;
    log::debug!("cmov: {} compressed bytes expanded to {}", cmov.compressed.len(), expanded.len());
    Ok(LeafOutcome::Expanded(expanded))
}

pub(crate) fn tkhd(_env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    let tkhd = Tkhd::read(payload)?;
    track.id = tkhd.track_id();
    track.track_duration = tkhd.duration();
    track.width = tkhd.width();
    track.height = tkhd.height();
    track.volume = tkhd.volume();
    track.x_scale = tkhd.matrix.x_scale();
    track.y_scale = tkhd.matrix.y_scale();
    Ok(LeafOutcome::Done)
}

pub(crate) fn mdhd(_env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    let mdhd = Mdhd::read(payload)?;
    track.time_scale = mdhd.time_scale();
    track.duration = mdhd.duration();
    track.language = mdhd.language().to_owned();
    Ok(LeafOutcome::Done)
}

pub(crate) fn hdlr(_env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    let hdlr = Hdlr::read(payload)?;
    // data handlers (minf/hdlr) describe the data reference, not the media
    if !hdlr.is_data_handler() {
        track.codec_type = CodecType::from(hdlr.component_sub_type());
        track.name = hdlr.component_name().to_owned();
    }
    Ok(LeafOutcome::Done)
}

pub(crate) fn elst(_env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    track.edit_list = Elst::read(payload)?.entries;
    Ok(LeafOutcome::Done)
}

pub(crate) fn stsd(env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    let stsd = Stsd::read(payload)?;

    for entry in stsd.entries {
        let description = match env.registry.interpret(track.codec_type, entry.codec_tag, &entry.body) {
            Some(SampleDescription::Audio(mut audio)) => {
                if audio.sample_rate == 0.0 && track.time_scale > 1 {
                    audio.sample_rate = track.time_scale as f64;
                }
                SampleDescription::Audio(audio)
            },
            Some(description) => description,
            None => {
                log::warn!("Track {} (id {}): unsupported codec '{}'", track.index, track.id, entry.codec_tag);
                if track.status == TrackStatus::Ready {
                    track.status = TrackStatus::Unsupported(entry.codec_tag);
                }
                SampleDescription::Other(RawDescription {
                    codec_tag: entry.codec_tag,
                    data: entry.body,
                })
            },
        };
        track.sample_descriptions.push(description);
    }

    Ok(LeafOutcome::Done)
}

pub(crate) fn stts(_env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    track.time_to_sample = Stts::read(payload)?.table;
    Ok(LeafOutcome::Done)
}

pub(crate) fn stss(_env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    track.keyframes = Stss::read(payload)?.samples;
    Ok(LeafOutcome::Done)
}

pub(crate) fn stsc(_env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    track.sample_to_chunk = Stsc::read(payload)?.table;
    Ok(LeafOutcome::Done)
}

pub(crate) fn stsz(_env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    let stsz = Stsz::read(payload)?;
    track.sample_size = stsz.sizes;
    track.stsz_count = stsz.count;
    Ok(LeafOutcome::Done)
}

pub(crate) fn stco(env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    track.chunk_offsets = Stco::read(payload)?.absolute(env.presentation.begin_offset);
    Ok(LeafOutcome::Done)
}

pub(crate) fn co64(env: &mut ParseEnv<'_>, scope: &mut Scope<'_>, payload: &mut AtomPayload) -> Result<LeafOutcome, QtError> {
    let track = in_track!(scope, payload);
    track.chunk_offsets = Co64::read(payload)?.absolute(env.presentation.begin_offset);
    Ok(LeafOutcome::Done)
}
