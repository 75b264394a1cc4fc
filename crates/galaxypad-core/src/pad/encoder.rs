use crate::pad::compress::StatusCompressor;
use crate::pad::format::{HEADER_RESERVED, HEADER_SIZE, PacketHeader, padding_for};
use crate::record::Frame;

/// Serialize a recording into PAD bytes.
///
/// Every frame becomes a player 1 packet carrying the compressed statuses
/// followed by an empty player 2 packet. The packet index is a running
/// counter over both.
pub fn encode_pad(game_data: &[u8], frames: &[Frame]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE as usize + 4 + game_data.len() + frames.len() * 64);

    out.extend_from_slice(&HEADER_SIZE.to_be_bytes());
    out.extend_from_slice(&[0; HEADER_RESERVED]);
    out.extend_from_slice(&(game_data.len() as u32).to_be_bytes());
    out.extend_from_slice(game_data);

    let mut compressor = StatusCompressor::new();
    let mut payload = Vec::new();
    let mut index: u32 = 0;

    for frame in frames {
        payload.clear();
        compressor.compress(frame.statuses(), &mut payload);

        let player1 = PacketHeader::new(index, payload.len() as u16, frame.len() as u8);
        out.extend_from_slice(&player1.to_word().to_be_bytes());
        out.extend_from_slice(&payload);

        let player2 = PacketHeader::new(index.wrapping_add(1), 0, 0);
        out.extend_from_slice(&player2.to_word().to_be_bytes());

        index = index.wrapping_add(2);
    }

    out.extend_from_slice(&PacketHeader::terminator(index).to_word().to_be_bytes());
    out.resize(out.len() + padding_for(out.len()), 0);
    out
}
