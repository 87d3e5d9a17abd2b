//! Recursive descent over the atom tree.
//!
//! Container atoms are walked in place on the byte stream. Leaf atoms are
//! buffered and handed to a handler looked up by FourCC. Handlers
//! update either the movie or the track currently being built.

use std::{collections::HashMap, io::Cursor};

use crate::{
    codec::SampleDescriptionRegistry,
    stream::ByteStream,
    FourCC,
    ParseOptions,
    Presentation,
    QtError,
    Track,
};

use super::{handlers, AtomHeader, AtomPayload};

/// Where leaf handlers write.
pub(crate) enum Scope<'t> {
    Movie,
    Track(&'t mut Track),
}

impl Scope<'_> {
    pub(crate) fn track(&mut self) -> Option<&mut Track> {
        match self {
            Self::Track(track) => Some(track),
            Self::Movie => None,
        }
    }
}

/// Shared parse state.
pub(crate) struct ParseEnv<'a> {
    pub(crate) presentation: &'a mut Presentation,
    pub(crate) registry: &'a dyn SampleDescriptionRegistry,
    pub(crate) options: &'a ParseOptions,
}

pub(crate) enum LeafOutcome {
    Done,
    /// Leaf expanded to a new atom tree (e.g. `cmov`),
    /// descended in the same scope.
    Expanded(Vec<u8>),
}

pub(crate) type LeafHandler =
    fn(&mut ParseEnv<'_>, &mut Scope<'_>, &mut AtomPayload) -> Result<LeafOutcome, QtError>;

#[derive(Clone, Copy)]
enum Handler {
    Leaf(LeafHandler),
    Container,
    Track,
}

/// FourCC to handler table.
pub(crate) struct AtomDispatcher {
    table: HashMap<FourCC, Handler>,
}

impl Default for AtomDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self { table: HashMap::new() };

        for container in [FourCC::MOOV, FourCC::MDIA, FourCC::MINF, FourCC::STBL, FourCC::EDTS] {
            dispatcher.table.insert(container, Handler::Container);
        }
        dispatcher.table.insert(FourCC::TRAK, Handler::Track);

        let leaves: [(FourCC, LeafHandler); 13] = [
            (FourCC::MVHD, handlers::mvhd),
            (FourCC::CMOV, handlers::cmov),
            (FourCC::TKHD, handlers::tkhd),
            (FourCC::MDHD, handlers::mdhd),
            (FourCC::HDLR, handlers::hdlr),
            (FourCC::ELST, handlers::elst),
            (FourCC::STSD, handlers::stsd),
            (FourCC::STTS, handlers::stts),
            (FourCC::STSS, handlers::stss),
            (FourCC::STSC, handlers::stsc),
            (FourCC::STSZ, handlers::stsz),
            (FourCC::STCO, handlers::stco),
            (FourCC::CO64, handlers::co64),
        ];
        for (name, handler) in leaves {
            dispatcher.register(name, handler);
        }

        dispatcher
    }
}

impl AtomDispatcher {
    pub(crate) fn register(&mut self, name: FourCC, handler: LeafHandler) {
        self.table.insert(name, Handler::Leaf(handler));
    }

    /// Walks sibling atoms in `[start, end)`.
    ///
    /// A malformed child header abandons the rest of the container.
    /// Inside a track this also marks the track as partial.
    pub(crate) fn descend<S: ByteStream>(
        &self,
        stream: &mut S,
        env: &mut ParseEnv<'_>,
        scope: &mut Scope<'_>,
        start: u64,
        end: u64,
        depth: usize,
    ) -> Result<(), QtError> {
        if depth > env.options.max_depth {
            return Err(QtError::RecurseDepthExceeded { depth, max: env.options.max_depth })
        }

        let mut pos = start;
        while pos < end {
            stream.seek_to(pos)?;
            let header = match AtomHeader::next_atom(stream, end) {
                Ok(Some(header)) => header,
                Ok(None) => break,
                Err(err) if err.is_recoverable() => {
                    match scope.track() {
                        Some(track) => track.poison(&err),
                        None => log::warn!("Abandoning container at {pos}: {err}"),
                    }
                    break
                },
                Err(err) => return Err(err),
            };
            pos = header.end();

            self.dispatch(stream, env, scope, &header, depth)?;
        }

        Ok(())
    }

    fn dispatch<S: ByteStream>(
        &self,
        stream: &mut S,
        env: &mut ParseEnv<'_>,
        scope: &mut Scope<'_>,
        header: &AtomHeader,
        depth: usize,
    ) -> Result<(), QtError> {
        let handler = match self.table.get(&header.name) {
            Some(handler) => *handler,
            None if header.is_container() => Handler::Container,
            None => {
                log::debug!("Skipping '{}' @ {} ({} bytes)", header.name, header.offset, header.atom_size);
                return Ok(())
            },
        };

        match handler {
            Handler::Container => {
                self.descend(stream, env, scope, header.data_offset(), header.end(), depth + 1)
            },
            Handler::Track => self.track(stream, env, scope, header, depth),
            Handler::Leaf(leaf) => {
                let outcome = AtomPayload::read(stream, header, env.options.max_leaf_size)
                    .and_then(|mut payload| leaf(env, scope, &mut payload));
                match outcome {
                    Ok(LeafOutcome::Done) => Ok(()),
                    Ok(LeafOutcome::Expanded(data)) => {
                        let len = data.len() as u64;
                        let mut inner = Cursor::new(data);
                        self.descend(&mut inner, env, scope, 0, len, depth + 1)
                    },
                    Err(err) if err.is_recoverable() => match scope.track() {
                        Some(track) => {
                            track.poison(&err);
                            Ok(())
                        },
                        // movie level headers are required
                        None => Err(err),
                    },
                    Err(err) => Err(err),
                }
            },
        }
    }

    /// Builds a track from a `trak` atom and adds it to the movie.
    fn track<S: ByteStream>(
        &self,
        stream: &mut S,
        env: &mut ParseEnv<'_>,
        scope: &mut Scope<'_>,
        header: &AtomHeader,
        depth: usize,
    ) -> Result<(), QtError> {
        if scope.track().is_some() {
            log::warn!("Skipping nested 'trak' @ {}", header.offset);
            return Ok(())
        }
        let max = env.options.max_tracks;
        if env.presentation.tracks.len() >= max {
            return Err(QtError::TooManyTracks { max })
        }

        let mut track = Track::new(env.presentation.tracks.len());
        let mut track_scope = Scope::Track(&mut track);
        match self.descend(stream, env, &mut track_scope, header.data_offset(), header.end(), depth + 1) {
            Ok(()) => (),
            Err(err) if err.is_recoverable() => track.poison(&err),
            Err(err) => return Err(err),
        }
        track.finalize();

        log::debug!(
            "Track {} (id {}): {:?}, {} chunks, {} samples, {}",
            track.index, track.id, track.codec_type, track.chunk_count, track.sample_count, track.status
        );

        env.presentation.tracks.push(track);

        Ok(())
    }
}
