use pretty_assertions::assert_eq;

use sim86_rs::disasm::listing;
use sim86_rs::exec::ImmExecutor;
use sim86_rs::{BitCursor, Cpu, CpuConfig, FieldWalker, RegisterId};

fn run(bytes: &[u8]) -> (Cpu, sim86_rs::Run) {
    let mut cpu = Cpu::new(CpuConfig::default());
    let mut cursor = BitCursor::new(bytes.to_vec());
    let run = cpu.run(&mut cursor, &FieldWalker::new(), &ImmExecutor);
    assert_eq!(run.trap, None);
    (cpu, run)
}

#[test]
fn byte_moves_compose_word() {
    // mov al, 0x12 ; mov ah, 0x34
    let (cpu, _) = run(&[0xB0, 0x12, 0xB4, 0x34]);
    assert_eq!(cpu.regs.get(RegisterId::Ax), 0x3412);
    assert_eq!(cpu.regs.get(RegisterId::Al), 0x12);
    assert_eq!(cpu.regs.get(RegisterId::Ah), 0x34);
}

#[test]
fn immediate_add_sub_update_registers() {
    let (cpu, run) = run(&[
        0xBB, 0x00, 0xF0, // mov bx, -4096
        0x81, 0xC3, 0x00, 0x10, // add bx, 4096
        0xB4, 0x77, // mov ah, 119
        0xB0, 0x05, // mov al, 5
        0x2C, 0x09, // sub al, 9
        0x83, 0xC6, 0x02, // add si, 2
        0x83, 0xEE, 0x05, // sub si, 5
        0x05, 0xE8, 0x03, // add ax, 1000
    ]);
    assert_eq!(run.instructions.len(), 8);
    assert_eq!(cpu.regs.get(RegisterId::Bx), 0);
    assert_eq!(cpu.regs.get(RegisterId::Si), 0xFFFD);
    // al wrapped to 0xFC without borrowing from ah, then ax += 1000
    assert_eq!(cpu.regs.get(RegisterId::Ax), 0x77FCu16.wrapping_add(1000));
}

#[test]
fn only_immediate_register_forms_mutate() {
    let (cpu, _) = run(&[
        0xBB, 0x02, 0x00, // mov bx, 2
        0x89, 0xD9, // mov cx, bx
        0x3C, 0x03, // cmp al, 3
        0xC6, 0x46, 0x04, 0x07, // mov [bp + 4], byte 7
        0x83, 0x3E, 0xE2, 0x12, 0x1D, // cmp [4834], word 29
        0x75, 0xFC, // jne -4
    ]);
    for reg in RegisterId::ALL {
        let expect = if matches!(reg, RegisterId::Bx | RegisterId::Bl) { 2 } else { 0 };
        assert_eq!(cpu.regs.get(reg), expect, "{reg}");
    }
}

#[test]
fn execution_can_be_disabled() {
    let mut cpu = Cpu::new(CpuConfig { execute: false, ..CpuConfig::default() });
    let mut cursor = BitCursor::new(vec![0xB8, 0x01, 0x00]);
    let run = cpu.run(&mut cursor, &FieldWalker::new(), &ImmExecutor);
    assert_eq!(run.instructions[0].text, "mov ax, 1");
    assert_eq!(cpu.regs.get(RegisterId::Ax), 0);
}

#[test]
fn reset_clears_registers_between_streams() {
    let (mut cpu, _) = run(&[0xB8, 0x01, 0x00, 0xB3, 0x07]);
    assert_eq!(cpu.regs.get(RegisterId::Bl), 7);
    cpu.reset();
    assert_eq!(cpu.regs, sim86_rs::RegisterFile::new());

    let mut cursor = BitCursor::new(vec![0x83, 0xC0, 0x02]);
    cpu.run(&mut cursor, &FieldWalker::new(), &ImmExecutor);
    assert_eq!(cpu.regs.get(RegisterId::Ax), 2);
}

#[test]
fn listing_and_register_dump() {
    let (cpu, run) = run(&[0xB0, 0x05, 0x89, 0xD9, 0xA1, 0xE8, 0x03]);
    assert_eq!(listing(&run.instructions), "bits 16\nmov al, 5\nmov cx, bx\nmov ax, [1000]\n");

    let dump = cpu.regs.to_string();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 16);
    assert_eq!(lines[0], "al 101 (lo)");
    assert_eq!(lines[4], "ah 0 (hi)");
    assert_eq!(lines[8], "ax 101");
    assert_eq!(lines[15], "di 0");

    let json = serde_json::to_value(cpu.regs.dump()).unwrap();
    assert_eq!(json[0], serde_json::json!({ "name": "al", "value": 5 }));
}

#[test]
fn instruction_records_offsets_and_bytes() {
    let (_, run) = run(&[0xB0, 0x05, 0x8B, 0x41, 0xDB]);
    let second = &run.instructions[1];
    assert_eq!(second.offset, 2);
    assert_eq!(second.bytes, vec![0x8B, 0x41, 0xDB]);
}
