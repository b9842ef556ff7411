//! Halo row exchange between row neighbours.
//!
//! Every iteration a rank sends its first owned row to the rank above and
//! its last owned row to the rank below, and receives their boundary rows
//! into its two halo rows. Rows travelling up and rows travelling down
//! carry different tags, so a receiver waiting on one direction can never
//! consume a message meant for the other.

use crate::decomposition::ProcessTopology;
use crate::domain::GridBuffer;
use crate::error::*;

pub type Tag = i32;

/// Rows sent to the rank above.
pub const UPWARD_TAG: Tag = 0;
/// Rows sent to the rank below.
pub const DOWNWARD_TAG: Tag = 1;
/// Owned rows sent to the coordinator at the end of the run.
pub const GATHER_TAG: Tag = 2;

/// Side of the local subgrid a neighbour sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn send_tag(self) -> Tag {
        match self {
            Direction::Up => UPWARD_TAG,
            Direction::Down => DOWNWARD_TAG,
        }
    }

    /// The neighbour sends towards us, i.e. in the opposite direction.
    pub fn recv_tag(self) -> Tag {
        match self {
            Direction::Up => DOWNWARD_TAG,
            Direction::Down => UPWARD_TAG,
        }
    }
}

/// One neighbour's half of an exchange: the row we send and the halo row
/// we receive into.
#[derive(Debug)]
pub struct HaloSlot<'a> {
    pub direction: Direction,
    pub neighbor: usize,
    pub send: &'a [f64],
    pub recv: &'a mut [f64],
}

/// Paired non-blocking row exchange.
///
/// `exchange` issues every send and receive in `slots`, then waits for all
/// of them. It returns only once every halo row is filled; partial
/// completion is never observable by the caller.
pub trait HaloChannel {
    fn exchange(&mut self, slots: Vec<HaloSlot<'_>>) -> Result<()>;
}

/// Build the exchange for a local subgrid buffer with `owned_rows` owned
/// rows. Sides without a neighbour get no slot and keep their halo row.
pub fn halo_slots<'a>(
    buffer: &'a mut GridBuffer,
    owned_rows: usize,
    topology: &ProcessTopology,
) -> Vec<HaloSlot<'a>> {
    let cols = buffer.cols();
    debug_assert_eq!(buffer.rows(), owned_rows + 2);
    if owned_rows == 0 {
        return Vec::new();
    }

    let (top_halo, rest) = buffer.buffer_mut().split_at_mut(cols);
    let (owned, bottom_halo) = rest.split_at_mut(owned_rows * cols);
    let owned: &'a [f64] = owned;

    let mut slots = Vec::with_capacity(2);
    if let Some(above) = topology.above() {
        slots.push(HaloSlot {
            direction: Direction::Up,
            neighbor: above,
            send: &owned[..cols],
            recv: top_halo,
        });
    }
    if let Some(below) = topology.below() {
        slots.push(HaloSlot {
            direction: Direction::Down,
            neighbor: below,
            send: &owned[(owned_rows - 1) * cols..],
            recv: bottom_halo,
        });
    }
    slots
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::decomposition::*;

    #[test]
    fn tags_pair_up() {
        // What one side sends upward the other side receives from below.
        assert_eq!(Direction::Up.send_tag(), Direction::Down.recv_tag());
        assert_eq!(Direction::Down.send_tag(), Direction::Up.recv_tag());
        assert_ne!(Direction::Up.send_tag(), Direction::Down.send_tag());
        assert_ne!(GATHER_TAG, UPWARD_TAG);
        assert_ne!(GATHER_TAG, DOWNWARD_TAG);
    }

    #[test]
    fn middle_rank_has_two_slots() {
        let partition = RowPartition::new(9, 3);
        let topology = ProcessTopology::new(&partition, 1);
        let mut buffer = GridBuffer::try_new(5, 2).unwrap();
        for (i, v) in buffer.buffer_mut().iter_mut().enumerate() {
            *v = i as f64;
        }
        let slots = halo_slots(&mut buffer, 3, &topology);
        assert_eq!(slots.len(), 2);

        assert_eq!(slots[0].direction, Direction::Up);
        assert_eq!(slots[0].neighbor, 0);
        assert_eq!(slots[0].send, &[2.0, 3.0]);
        assert_eq!(slots[0].recv, &[0.0, 1.0]);

        assert_eq!(slots[1].direction, Direction::Down);
        assert_eq!(slots[1].neighbor, 2);
        assert_eq!(slots[1].send, &[6.0, 7.0]);
        assert_eq!(slots[1].recv, &[8.0, 9.0]);
    }

    #[test]
    fn chain_ends_have_one_slot() {
        let partition = RowPartition::new(9, 3);
        let mut buffer = GridBuffer::try_new(5, 2).unwrap();

        let first = ProcessTopology::new(&partition, 0);
        let slots = halo_slots(&mut buffer, 3, &first);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].direction, Direction::Down);

        let last = ProcessTopology::new(&partition, 2);
        let slots = halo_slots(&mut buffer, 3, &last);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].direction, Direction::Up);
    }

    #[test]
    fn single_owned_row_sent_both_ways() {
        let partition = RowPartition::new(3, 3);
        let topology = ProcessTopology::new(&partition, 1);
        let mut buffer = GridBuffer::from_vec(3, 1, vec![0.0, 5.0, 0.0]);
        let slots = halo_slots(&mut buffer, 1, &topology);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].send, &[5.0]);
        assert_eq!(slots[1].send, &[5.0]);
    }
}
