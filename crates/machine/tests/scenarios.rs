//! End-to-end machine scenarios driven through the port and event surface,
//! the way the host loop and guest firmware would.

use pac80_core::cpu_8080::Bus8080;
use pac80_core::types::Frame;
use pac80_machine::machine::SLICE_CYCLES;
use pac80_machine::memory::ROM_SIZE;
use pac80_machine::{CfImage, InputEvent, Machine, PadButton};

fn boot(rom_patch: &[(usize, u8)], image: CfImage) -> Machine {
    let mut rom = vec![0; ROM_SIZE];
    for &(addr, byte) in rom_patch {
        rom[addr] = byte;
    }
    Machine::new(rom, image).unwrap()
}

fn scratch_image(len: usize) -> CfImage {
    CfImage::anon(len).unwrap()
}

#[test]
fn boot_halts_on_first_instruction() {
    // A ROM of NOPs with HLT up front: one slice later the CPU is parked
    // at PC=1 and VA15 is set from reset.
    let mut m = boot(&[(0, 0x76)], scratch_image(512));
    m.step_slice();
    assert!(m.cpu().halted);
    assert_eq!(m.cpu().pc, 1);
    assert_eq!(m.board().ppi.c & 0x01, 0x01);
}

#[test]
fn bank_swap_exposes_ram() {
    let mut m = boot(&[(0, 0x76)], scratch_image(512));
    let b = m.board_mut();

    // Map bank 0 to RAM window 0 and read the selection back
    b.port_out(0x08, 0x00);
    assert_eq!(b.port_in(0x08), 0xF0);

    b.write_byte(0x0000, 0xFF);
    assert_eq!(b.read_byte(0x0000), 0xFF);

    // Back to ROM: the write is gone and the bank reads as ROM again
    b.port_out(0x08, 0x0F);
    assert_eq!(b.port_in(0x08), 0xFF);
    assert_eq!(b.read_byte(0x0000), 0x76);
}

#[test]
fn rom_mapped_bank_drops_writes() {
    let mut m = boot(&[(0x100, 0x5A)], scratch_image(512));
    let b = m.board_mut();
    b.write_byte(0x0100, 0xA5);
    assert_eq!(b.read_byte(0x0100), 0x5A);
}

#[test]
fn cf_sector_read_matches_image() {
    // 1 MiB patterned image, read LBA 2 through the register file
    let data: Vec<u8> = (0..1024 * 1024).map(|i| i as u8).collect();
    let mut m = boot(&[(0, 0x76)], CfImage::from_bytes(&data).unwrap());
    let b = m.board_mut();

    b.port_out(0x32, 1); // sector count
    b.port_out(0x33, 2); // LBA 0
    b.port_out(0x34, 0);
    b.port_out(0x35, 0);
    b.port_out(0x36, 0);
    b.port_out(0x37, 0x20); // READ SECTORS

    assert_eq!(b.port_in(0x37), 0x08); // DRQ up
    let bytes: Vec<u8> = (0..512).map(|_| b.port_in(0x30)).collect();
    assert_eq!(bytes, data[2 * 512..3 * 512]);
    assert_eq!(b.port_in(0x37), 0x00); // transfer complete
}

#[test]
fn cf_write_persists_into_the_image() {
    let mut m = boot(&[(0, 0x76)], scratch_image(4 * 512));
    let b = m.board_mut();

    b.port_out(0x32, 1);
    b.port_out(0x33, 3);
    b.port_out(0x34, 0);
    b.port_out(0x35, 0);
    b.port_out(0x36, 0);
    b.port_out(0x37, 0x30); // WRITE SECTORS
    for i in 0..512u32 {
        b.port_out(0x30, (i ^ 0x55) as u8);
    }
    assert_eq!(b.port_in(0x37), 0x00);
    assert_eq!(b.cf.image().as_slice()[3 * 512], 0x55);
    assert_eq!(b.cf.image().as_slice()[3 * 512 + 511], (511u32 ^ 0x55) as u8);
}

#[test]
fn cf_transfer_past_image_end_reports_err() {
    let mut m = boot(&[(0, 0x76)], scratch_image(512));
    let b = m.board_mut();
    b.port_out(0x32, 2); // two sectors, image holds one
    b.port_out(0x33, 0);
    b.port_out(0x34, 0);
    b.port_out(0x35, 0);
    b.port_out(0x36, 0);
    b.port_out(0x37, 0x20);
    for _ in 0..512 {
        b.port_in(0x30);
    }
    assert_eq!(b.port_in(0x37), 0x01);
}

#[test]
fn serial_echo_through_the_machine() {
    // Guest firmware: wait for RXRDY, read the byte, add one, send it back.
    //   loop: IN 0x29; ANI 0x02; JZ loop
    //         IN 0x28; INR A; OUT 0x28; HLT
    let program: &[(usize, u8)] = &[
        (0, 0xDB),
        (1, 0x29),
        (2, 0xE6),
        (3, 0x02),
        (4, 0xCA),
        (5, 0x00),
        (6, 0x00),
        (7, 0xDB),
        (8, 0x28),
        (9, 0x3C),
        (10, 0xD3),
        (11, 0x28),
        (12, 0x76),
    ];
    let mut m = boot(program, scratch_image(512));
    m.step_slice();
    assert!(!m.cpu().halted); // still polling

    m.serial_rx(0x41);
    while !m.cpu().halted {
        m.step_slice();
    }
    assert_eq!(m.serial_tx(), Some(0x42));
    assert_eq!(m.serial_tx(), None);
}

#[test]
fn keyboard_press_latches_and_clears() {
    let mut m = boot(&[(0, 0x76)], scratch_image(512));
    m.input(InputEvent::Key {
        code: 0x1E,
        pressed: true,
    });
    m.step_slice();

    let b = m.board_mut();
    assert_eq!(b.port_in(0x18), 0x1E);
    // No further key: the buffer-full flag stays down
    assert_eq!(b.port_in(0x1C) & 0x20, 0);
}

#[test]
fn vblank_vectors_through_rst7() {
    // EI; NOP; JMP 2 — then the frame tick must steer PC into 0x38
    let program: &[(usize, u8)] = &[
        (0, 0xFB),
        (1, 0x00),
        (2, 0xC3),
        (3, 0x02),
        (4, 0x00),
        (0x38, 0x76), // HLT in the interrupt handler
    ];
    let mut m = boot(program, scratch_image(512));
    m.board_mut().port_out(0x1C, 0x03); // VA15 | VINTE
    m.step_slice();
    m.vblank();
    m.step_slice();
    assert!(m.cpu().halted);
    assert_eq!(m.cpu().pc, 0x39);
}

#[test]
fn six_button_probe_reads_z_through_port_b() {
    let mut m = boot(&[(0, 0x76)], scratch_image(512));
    m.input(InputEvent::PadButton {
        button: PadButton::Z,
        pressed: true,
    });

    let b = m.board_mut();
    // Walk the select line: low/high three times lands on phase 3
    for _ in 0..2 {
        b.port_in(0x19); // SEL low
        b.port_in(0x1B); // SEL high
    }
    b.port_in(0x19);
    let phase3 = b.port_in(0x1B);
    assert_eq!(phase3 & 0x01, 0); // Z shows up on the UP line
    assert_ne!(phase3 & 0x04, 0);
}

#[test]
fn framebuffer_pixel_appears_after_bank_write() {
    let mut m = boot(&[(0, 0x76)], scratch_image(512));
    // VA15 is set at reset, so plane 0 sits at 0x19810. Pixel (13, 7):
    // byte 0x19810 + (13 >> 3) * 0x100 + 7, mask 0x80 >> 5.
    let addr = 0x19810 + 0x100 + 7;
    m.board_mut().mem.ram_mut()[addr] = 0x80 >> 5;

    let mut frame = Frame::new(320, 240);
    m.render(&mut frame);
    assert_eq!(frame.pixels[7 * 320 + 13], 0xFF2A547E);
    assert_eq!(frame.pixels[7 * 320 + 12], 0xFF000000);
}

#[test]
fn slice_budget_carries_over() {
    // An instruction stream that never halts: two slices must execute
    // roughly twice the quota, with the remainder carried between them.
    let mut m = boot(&[(0, 0xC3), (1, 0x00), (2, 0x00)], scratch_image(512));
    m.step_slice();
    let after_one = m.cpu().cycles;
    m.step_slice();
    let after_two = m.cpu().cycles;
    assert!(after_one >= SLICE_CYCLES as u64);
    assert!(after_two - after_one <= SLICE_CYCLES as u64 + 17);
}
