//! GraphQL documents sent by the request builder.

pub const CREATE_OUTPOST: &str = r"mutation CreateOutpost($input: CreateOutpostInput!) {
  createOutpost(input: $input) {
    outpost {
      id
    }
  }
}";

/// Full record projection; every config fragment is requested regardless of
/// the outpost's provider.
pub const READ_OUTPOST: &str = r"query OutpostDetails($id: ID!) {
  outpost(id: $id) {
    id
    name
    enabled
    serviceType
    allowedRegions
    selfManaged
    externalInternetAccess
    selfManagedConfig {
      disableAutomaticConfigurationBucketSync
      imageRepository
      version {
        id
        images {
          url
        }
      }
    }
    managedConfig {
      kubernetesLoggingEnabled
      manualNetwork
      kubernetesCloudMonitoringEnabled
    }
    status
    errorCode
    createdAt
    addedBy {
      id
      name
      email
    }
    clusters {
      ...OutpostClusterDetails
    }
    customConfig {
      podAnnotations
      resourceTags
      namespacePrefix
    }
    config {
      __typename
      ... on OutpostAWSConfig {
        roleARN
        externalID
        stateBucketName
        settingsRegion
        accessKey
        secretKey
        disableNatGateway
        resultsBucketName
        subscriptionID
      }
      ... on OutpostGCPConfig {
        orchestratorKey
        workerAccountEmail
        stateBucketName
        disableNatGateway
      }
      ... on OutpostAzureConfig {
        tenantID
        subscriptionID
        keyVaultName
        applicationKeyVaultName
        orchestratorClientID
        orchestratorClientSecret
        workerClientID
        workerClientSecret
        scannerAppID
        deployPremiumServiceBus
        enablePrivateCluster
        environment
        stateStorageAccountName
        globalResourceGroupName
      }
      ... on OutpostOCIConfig {
        compartmentOCID
        vaultOCID
        keyOCID
        stateBucketName
        orchestrator {
          fingerprint
          privateKey
        }
      }
      ... on OutpostAlibabaConfig {
        workerResourcesGroupID
        stateBucketName
        outpostCredentials {
          orchestratorAccessKeyID
          orchestratorAccessKeySecret
        }
      }
    }
  }
}

fragment OutpostClusterDetails on OutpostCluster {
  id
  region
  createdAt
  httpProxyConfig {
    httpProxyURL
    httpsProxyURL
    vpcCIDRs
  }
  nodeGroups {
    nodeGroupId
    type
    maxNodeCount
    minNodeCount
  }
  config {
    __typename
    ... on OutpostClusterAWSConfig {
      clusterName
      sqsURL
      kubernetesServiceAccountName
    }
    ... on OutpostClusterAzureConfig {
      clusterName
      servicebusQueueName
      servicebusNamespace
      resourceGroupName
      storageAccountNames
      subscriptionId
      serviceAuthorizedIPRanges
    }
    ... on OutpostClusterGCPConfig {
      clusterName
      projectId
      clusterZone
      topicName
      pubSubSubscription
    }
    ... on OutpostClusterOCIConfig {
      clusterName
      streamOCID
    }
    ... on OutpostClusterAlibabaConfig {
      clusterName
      queueName
    }
  }
  addedBy {
    id
    name
    email
  }
}";

pub const UPDATE_OUTPOST: &str = r"mutation UpdateOutpost($input: UpdateOutpostInput!) {
  updateOutpost(input: $input) {
    outpost {
      id
    }
  }
}";

/// Deletes the control backing the outpost.
pub const DELETE_CONTROL: &str = r"mutation DeleteControl($input: DeleteControlInput!) {
  deleteControl(input: $input) {
    _stub
  }
}";

/// Uninstalls the outpost itself.
pub const DELETE_OUTPOST: &str = r"mutation DeleteOutpost($input: DeleteOutpostInput!) {
  deleteOutpost(input: $input) {
    _stub
  }
}";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProviderKind;

    #[test]
    fn test_read_requests_every_fragment() {
        for kind in ProviderKind::CONFIGURED {
            let config = kind.typename().unwrap();
            let cluster = kind.cluster_typename().unwrap();
            assert!(READ_OUTPOST.contains(&format!("... on {config} {{")), "{config}");
            assert!(READ_OUTPOST.contains(&format!("... on {cluster} {{")), "{cluster}");
            for field in kind.config_fields() {
                assert!(READ_OUTPOST.contains(field), "{field}");
            }
        }
    }

    #[test]
    fn test_mutations_name_their_input_types() {
        assert!(CREATE_OUTPOST.contains("CreateOutpostInput!"));
        assert!(UPDATE_OUTPOST.contains("UpdateOutpostInput!"));
        assert!(DELETE_CONTROL.contains("deleteControl(input: $input)"));
        assert!(DELETE_OUTPOST.contains("deleteOutpost(input: $input)"));
    }
}
