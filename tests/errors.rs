use sim86_rs::exec::ImmExecutor;
use sim86_rs::{
    BitCursor, Cpu, CpuConfig, DecodeError, Decoder, ErrorPolicy, FieldWalker, RegisterId, Trap,
};

fn run_bytes(bytes: &[u8], on_error: ErrorPolicy) -> (Cpu, sim86_rs::Run) {
    let mut cpu = Cpu::new(CpuConfig { on_error, ..CpuConfig::default() });
    let mut cursor = BitCursor::new(bytes.to_vec());
    let run = cpu.run(&mut cursor, &FieldWalker::new(), &ImmExecutor);
    (cpu, run)
}

fn decode_err(bytes: &[u8]) -> DecodeError {
    FieldWalker::new()
        .decode(&mut BitCursor::new(bytes.to_vec()))
        .unwrap_err()
}

#[test]
fn unknown_and_stubbed_opcodes() {
    assert_eq!(decode_err(&[0x0F]), DecodeError::UnknownOpcode { byte: 0x0F });
    assert_eq!(
        decode_err(&[0x01, 0xD8]),
        DecodeError::Unimplemented { byte: 0x01, mnemonic: "add" }
    );
    assert_eq!(
        decode_err(&[0xE2, 0xFE]),
        DecodeError::Unimplemented { byte: 0xE2, mnemonic: "loop" }
    );
    assert_eq!(
        decode_err(&[0x80, 0xC8, 0x01]),
        DecodeError::Unimplemented { byte: 0x80, mnemonic: "or" }
    );
}

#[test]
fn fixed_bits_must_match() {
    // mov r/m, imm requires 000 in the REG slot
    assert_eq!(decode_err(&[0xC6, 0x48, 0x00, 0x01]), DecodeError::UnknownOpcode { byte: 0xC6 });
}

#[test]
fn truncated_fields() {
    assert_eq!(decode_err(&[0x8B]), DecodeError::TruncatedStream { offset: 1 });
    assert_eq!(decode_err(&[0x8B, 0x46]), DecodeError::TruncatedStream { offset: 2 });
    assert_eq!(decode_err(&[0xB8, 0x01]), DecodeError::TruncatedStream { offset: 2 });
    assert_eq!(decode_err(&[0xA1, 0xE8]), DecodeError::TruncatedStream { offset: 2 });
    // MOD=10 wants two displacement bytes
    assert_eq!(decode_err(&[0x8A, 0x80, 0x87]), DecodeError::TruncatedStream { offset: 3 });
    // sub sp, imm16 with S=0 wants a second data byte
    assert_eq!(decode_err(&[0x81, 0xEC, 0xE8]), DecodeError::TruncatedStream { offset: 3 });
}

#[test]
fn truncation_stops_run_without_partial_line() {
    let (cpu, run) = run_bytes(&[0xB0, 0x05, 0x8B, 0x46], ErrorPolicy::Abort);
    assert_eq!(run.lines().collect::<Vec<_>>(), vec!["mov al, 5"]);
    assert_eq!(
        run.trap,
        Some(Trap::Decode { offset: 2, source: DecodeError::TruncatedStream { offset: 4 } })
    );
    assert_eq!(cpu.regs.get(RegisterId::Al), 5);
}

#[test]
fn unknown_opcode_aborts_by_default() {
    let (_, run) = run_bytes(&[0x89, 0xD9, 0x0F, 0xB0, 0x05], ErrorPolicy::Abort);
    assert_eq!(run.lines().collect::<Vec<_>>(), vec!["mov cx, bx"]);
    assert!(matches!(
        run.trap,
        Some(Trap::Decode { offset: 2, source: DecodeError::UnknownOpcode { byte: 0x0F } })
    ));
    assert!(run.skipped.is_empty());
}

#[test]
fn skip_policy_resynchronizes_on_next_byte() {
    let (cpu, run) = run_bytes(&[0x0F, 0xB0, 0x05], ErrorPolicy::Skip);
    assert_eq!(run.lines().collect::<Vec<_>>(), vec!["mov al, 5"]);
    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.trap, None);
    assert_eq!(cpu.regs.get(RegisterId::Al), 5);

    // 0xB8 is cut short, then 0x01 alone is a stubbed add
    let (_, run) = run_bytes(&[0xB8, 0x01], ErrorPolicy::Skip);
    assert!(run.instructions.is_empty());
    assert_eq!(run.skipped.len(), 2);
}

#[test]
fn error_policy_reads_from_json() {
    let cfg: CpuConfig = serde_json::from_str(r#"{ "on_error": "skip" }"#).unwrap();
    assert_eq!(cfg.on_error, ErrorPolicy::Skip);
    assert!(cfg.execute);
}
