fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Protobuf types are only needed by the gRPC surface
    if std::env::var_os("CARGO_FEATURE_SERVER").is_some() {
        tonic_build::compile_protos("proto/game_optimizer.proto")?;
    }
    Ok(())
}
