//! Generation-checked cart handles.
//!
//! A handle packs a slot index and the slot's generation:
//!
//! ```text
//!   63                32 31                 0
//!  ┌──────────────────────┬───────────────────┐
//!  │      generation      │    slot index     │
//!  └──────────────────────┴───────────────────┘
//! ```
//!
//! Freeing a cart bumps the slot's generation, so every handle issued for the
//! old cart stops resolving. Generations start at 1, which keeps 0 free to
//! mean "no cart".

use till_core::Cart;

use crate::error::{FfiError, FfiResult};

/// Opaque cart handle as seen by hosts.
pub type CartHandle = u64;

#[derive(Debug)]
struct Slot {
    generation: u32,
    cart: Option<Cart>,
}

/// Owner of every live cart.
#[derive(Debug, Default)]
pub struct CartArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

fn pack(index: u32, generation: u32) -> CartHandle {
    (u64::from(generation) << 32) | u64::from(index)
}

fn unpack(handle: CartHandle) -> (u32, u32) {
    ((handle & 0xFFFF_FFFF) as u32, (handle >> 32) as u32)
}

impl CartArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `cart` and returns its handle.
    pub fn insert(&mut self, cart: Cart) -> FfiResult<CartHandle> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.cart = Some(cart);
            self.live += 1;
            return Ok(pack(index, slot.generation));
        }

        let index =
            u32::try_from(self.slots.len()).map_err(|_| FfiError::OutOfMemory("cart handle"))?;
        self.slots
            .try_reserve(1)
            .map_err(|_| FfiError::OutOfMemory("cart"))?;
        // Reserve the free-list entry now so `remove` never allocates.
        self.free
            .try_reserve(self.slots.len() + 1)
            .map_err(|_| FfiError::OutOfMemory("cart"))?;
        self.slots.push(Slot {
            generation: 1,
            cart: Some(cart),
        });
        self.live += 1;
        Ok(pack(index, 1))
    }

    fn slot(&self, handle: CartHandle) -> Option<&Slot> {
        let (index, generation) = unpack(handle);
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation && slot.cart.is_some())
    }

    pub fn get(&self, handle: CartHandle) -> FfiResult<&Cart> {
        self.slot(handle)
            .and_then(|slot| slot.cart.as_ref())
            .ok_or(FfiError::InvalidHandle(handle))
    }

    pub fn get_mut(&mut self, handle: CartHandle) -> FfiResult<&mut Cart> {
        let (index, generation) = unpack(handle);
        self.slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.cart.as_mut())
            .ok_or(FfiError::InvalidHandle(handle))
    }

    /// Takes the cart out and invalidates `handle`.
    pub fn remove(&mut self, handle: CartHandle) -> FfiResult<Cart> {
        if self.slot(handle).is_none() {
            return Err(FfiError::InvalidHandle(handle));
        }
        let (index, _) = unpack(handle);
        let slot = &mut self.slots[index as usize];
        let cart = slot.cart.take().ok_or(FfiError::InvalidHandle(handle))?;

        slot.generation = match slot.generation.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        self.free.push(index);
        self.live -= 1;
        Ok(cart)
    }

    /// Number of live carts.
    pub fn len(&self) -> usize {
        self.live
    }
}
